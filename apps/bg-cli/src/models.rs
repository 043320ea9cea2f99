//! Built-in demonstration models.

use bg_elements::{
    Capacitor, EffortSource, FlowSource, Gyrator, Inertia, ReliefValve, Resistor,
};
use bg_graph::{BondGraph, GraphResult};

pub struct ModelInfo {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> GraphResult<BondGraph>,
}

impl ModelInfo {
    pub fn build(&self) -> GraphResult<BondGraph> {
        (self.build)()
    }
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "rc",
        description: "Voltage source driving a series resistor and capacitor",
        build: rc,
    },
    ModelInfo {
        name: "rlc",
        description: "Series RLC circuit",
        build: rlc,
    },
    ModelInfo {
        name: "relief",
        description: "Pump charging an accumulator protected by a relief valve",
        build: relief,
    },
    ModelInfo {
        name: "motor",
        description: "DC motor: armature circuit coupled to a rotor through a gyrator",
        build: motor,
    },
];

pub fn find(name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.name == name)
}

fn rc() -> GraphResult<BondGraph> {
    let mut g = BondGraph::new();
    let u = g.add_one_port(EffortSource::new("u"))?;
    let j = g.add_one_junction("loop")?;
    let r = g.add_one_port(Resistor::new("r", 1.0e3)?)?;
    let c = g.add_one_port(Capacitor::new("c", 1.0e-6)?)?;
    g.connect(u, j)?;
    g.connect(j, r)?;
    g.connect(j, c)?;
    Ok(g)
}

fn rlc() -> GraphResult<BondGraph> {
    let mut g = BondGraph::new();
    let u = g.add_one_port(EffortSource::new("u"))?;
    let j = g.add_one_junction("loop")?;
    let r = g.add_one_port(Resistor::new("r", 10.0)?)?;
    let l = g.add_one_port(Inertia::new("l", 1.0e-3)?)?;
    let c = g.add_one_port(Capacitor::new("c", 1.0e-6)?)?;
    g.connect(u, j)?;
    g.connect(j, r)?;
    g.connect(j, l)?;
    g.connect(j, c)?;
    Ok(g)
}

fn relief() -> GraphResult<BondGraph> {
    let mut g = BondGraph::new();
    let pump = g.add_one_port(FlowSource::new("pump"))?;
    let rail = g.add_zero_junction("rail")?;
    let acc = g.add_one_port(Capacitor::new("acc", 1.0e-9)?)?;
    let valve = g.add_one_port(ReliefValve::new("relief", 1.0e7, 1.0e12, 1.0e-5, 2.0e7)?)?;
    let load = g.add_one_port(Resistor::new("load", 5.0e10)?)?;
    g.connect(pump, rail)?;
    g.connect(rail, acc)?;
    g.connect(rail, valve)?;
    g.connect(rail, load)?;
    Ok(g)
}

fn motor() -> GraphResult<BondGraph> {
    let mut g = BondGraph::new();
    let u = g.add_one_port(EffortSource::new("u"))?;
    let el = g.add_one_junction("armature")?;
    let ra = g.add_one_port(Resistor::new("ra", 0.5)?)?;
    let la = g.add_one_port(Inertia::new("la", 1.5e-3)?)?;
    let km = g.add_two_port(Gyrator::new("km", 0.05)?)?;
    let shaft = g.add_one_junction("shaft")?;
    let jm = g.add_one_port(Inertia::new("jm", 2.0e-4)?)?;
    let bm = g.add_one_port(Resistor::new("bm", 1.0e-5)?)?;
    g.connect(u, el)?;
    g.connect(el, ra)?;
    g.connect(el, la)?;
    g.connect(el, km)?;
    g.connect(km, shaft)?;
    g.connect(shaft, jm)?;
    g.connect(shaft, bm)?;
    Ok(g)
}
