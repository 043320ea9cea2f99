//! Integration tests for bg-graph.

use bg_elements::{
    Capacitor, EffortSource, FlowSource, Gyrator, Inertia, ReliefValve, Resistor, Transformer,
};
use bg_graph::{AnalysisOptions, BondGraph, ErrorClass, GraphError, JunctionKind};
use bg_symbolic::{Bindings, Symbol};

fn flags(graph: &BondGraph) -> Vec<Option<bool>> {
    graph.bonds().iter().map(|b| b.effort_in_at_to).collect()
}

fn series_rc() -> BondGraph {
    // Se -> 1 -> R, 1 -> C
    let mut graph = BondGraph::new();
    let u = graph.add_one_port(EffortSource::new("u")).unwrap();
    let j = graph.add_junction("loop", JunctionKind::One).unwrap();
    let r = graph.add_one_port(Resistor::new("r", 2.0).unwrap()).unwrap();
    let c = graph.add_one_port(Capacitor::new("c", 0.5).unwrap()).unwrap();
    graph.connect(u, j).unwrap();
    graph.connect(j, r).unwrap();
    graph.connect(j, c).unwrap();
    graph
}

#[test]
fn flow_source_drives_two_resistors() {
    let mut graph = BondGraph::new();
    let sf = graph.add_one_port(FlowSource::new("src")).unwrap();
    let j = graph.add_one_junction("j").unwrap();
    let r1 = graph.add_one_port(Resistor::new("r1", 3.0).unwrap()).unwrap();
    let r2 = graph.add_one_port(Resistor::new("r2", 5.0).unwrap()).unwrap();
    let b_src = graph.connect(sf, j).unwrap();
    let b_r1 = graph.connect(j, r1).unwrap();
    let b_r2 = graph.connect(j, r2).unwrap();

    graph.assign_causalities().unwrap();

    assert_eq!(graph.bond(b_src).unwrap().effort_in_at(j), Some(false));
    assert_eq!(graph.bond(b_r1).unwrap().effort_in_at(j), Some(true));
    assert_eq!(graph.bond(b_r2).unwrap().effort_in_at(j), Some(true));

    let system = graph.equations().unwrap();
    assert_eq!(system.equations.len(), 2);
    assert_eq!(system.inputs.len(), 1);
    assert_eq!(system.inputs[0].to_string(), "f_1 = F_src");
    // Balance plus one equality per non-determining bond.
    assert_eq!(system.junction_equations.len(), 3);
}

#[test]
fn rc_circuit_state_equation() {
    let mut graph = series_rc();
    let report = graph.assign_causalities().unwrap();
    assert!(report.preferred_causalities_valid());
    assert!(report.arbitrary.is_empty());

    let model = graph.state_equations().unwrap();
    assert_eq!(model.equations.len(), 1);
    assert_eq!(
        model.equations[0].to_string(),
        "d(q_c)/dt = (E_u - q_c / C_c) / R_r"
    );

    // (E - q / C) / R with E = 3, q = 1, C = 0.5, R = 2
    let values = Bindings::from([(Symbol::new("E_u"), 3.0), (Symbol::new("q_c"), 1.0)]);
    let rates = model.derivatives(&values).unwrap();
    assert!((rates[0] - 0.5).abs() < 1e-12);
}

#[test]
fn opposing_effort_sources_conflict_without_side_effects() {
    let mut graph = BondGraph::new();
    let a = graph.add_one_port(EffortSource::new("a")).unwrap();
    let b = graph.add_one_port(EffortSource::new("b")).unwrap();
    let c = graph.add_one_port(Capacitor::new("c", 1.0).unwrap()).unwrap();
    let j = graph.add_zero_junction("j").unwrap();
    graph.connect(a, b).unwrap();
    graph.connect(c, j).unwrap();

    let err = graph.assign_causalities().unwrap_err();
    assert!(matches!(
        err,
        GraphError::CausalityConflict { ref node, bond: 1, .. } if node == "b"
    ));
    assert_eq!(err.class(), ErrorClass::CausalityConflict);
    assert!(flags(&graph).iter().all(Option::is_none));
    assert!(matches!(
        graph.equations(),
        Err(GraphError::UndeterminedCausality { bond: 1 })
    ));
}

#[test]
fn two_effort_sources_on_a_zero_junction_conflict() {
    let mut graph = BondGraph::new();
    let a = graph.add_one_port(EffortSource::new("a")).unwrap();
    let j = graph.add_zero_junction("j").unwrap();
    let b = graph.add_one_port(EffortSource::new("b")).unwrap();
    let r = graph.add_one_port(Resistor::new("r", 1.0).unwrap()).unwrap();
    graph.connect(a, j).unwrap();
    graph.connect(j, r).unwrap();
    graph.connect(b, j).unwrap();

    assert!(matches!(
        graph.assign_causalities(),
        Err(GraphError::CausalityConflict { .. })
    ));
    assert!(flags(&graph).iter().all(Option::is_none));
}

#[test]
fn capacitor_across_effort_source_is_derivative() {
    let mut graph = BondGraph::new();
    let u = graph.add_one_port(EffortSource::new("u")).unwrap();
    let j = graph.add_zero_junction("j").unwrap();
    let c = graph.add_one_port(Capacitor::new("c", 1.0).unwrap()).unwrap();
    graph.connect(u, j).unwrap();
    let bc = graph.connect(j, c).unwrap();

    let report = graph.assign_causalities().unwrap();
    assert_eq!(report.derivative, vec![c]);
    assert!(!report.preferred_causalities_valid());

    let system = graph.equations().unwrap();
    assert!(system.state_equations.is_empty());
    assert_eq!(system.equations[0].to_string(), "f_2 = C_c * d(e_2)/dt");
    assert_eq!(graph.bond(bc).unwrap().causal_stroke(), Some(c));

    graph.reset_causalities();
    let strict = AnalysisOptions {
        reject_derivative_causality: true,
        ..AnalysisOptions::default()
    };
    let err = graph.assign_causalities_with(&strict).unwrap_err();
    assert_eq!(
        err,
        GraphError::DerivativeCausality {
            nodes: vec!["c".to_string()]
        }
    );
    assert!(flags(&graph).iter().all(Option::is_none));
}

#[test]
fn rigidly_coupled_inertias_need_derivative_causality() {
    let mut graph = BondGraph::new();
    let u = graph.add_one_port(EffortSource::new("u")).unwrap();
    let ja = graph.add_one_junction("ja").unwrap();
    let i1 = graph.add_one_port(Inertia::new("i1", 1.0).unwrap()).unwrap();
    let tf = graph.add_two_port(Transformer::new("gear", 3.0).unwrap()).unwrap();
    let jb = graph.add_one_junction("jb").unwrap();
    let i2 = graph.add_one_port(Inertia::new("i2", 2.0).unwrap()).unwrap();
    graph.connect(u, ja).unwrap();
    graph.connect(ja, i1).unwrap();
    graph.connect(ja, tf).unwrap();
    graph.connect(tf, jb).unwrap();
    graph.connect(jb, i2).unwrap();

    let report = graph.assign_causalities().unwrap();
    assert_eq!(report.derivative, vec![i2]);
    let model = graph.state_equations().unwrap();
    assert_eq!(model.states(), vec![Symbol::new("p_i1")]);
}

#[test]
fn resistors_alone_form_an_algebraic_loop() {
    let mut graph = BondGraph::new();
    let c = graph.add_one_port(Capacitor::new("c", 1.0).unwrap()).unwrap();
    let j = graph.add_one_junction("j").unwrap();
    let r1 = graph.add_one_port(Resistor::new("r1", 1.0).unwrap()).unwrap();
    let r2 = graph.add_one_port(Resistor::new("r2", 1.0).unwrap()).unwrap();
    graph.connect(c, j).unwrap();
    let b_r1 = graph.connect(j, r1).unwrap();
    graph.connect(j, r2).unwrap();

    let report = graph.assign_causalities().unwrap();
    assert_eq!(report.arbitrary, vec![b_r1]);
    assert!(flags(&graph).iter().all(Option::is_some));
    assert!(matches!(
        graph.state_equations(),
        Err(GraphError::AlgebraicLoop { .. })
    ));

    graph.reset_causalities();
    let strict = AnalysisOptions {
        reject_algebraic_loops: true,
        ..AnalysisOptions::default()
    };
    assert!(matches!(
        graph.assign_causalities_with(&strict),
        Err(GraphError::AlgebraicLoop { .. })
    ));
}

#[test]
fn topology_errors_are_raised_at_construction() {
    let mut graph = BondGraph::new();
    let j = graph.add_zero_junction("j").unwrap();
    let r = graph.add_one_port(Resistor::new("r", 1.0).unwrap()).unwrap();

    let dup = graph.add_one_junction("r").unwrap_err();
    assert_eq!(dup.class(), ErrorClass::Topology);

    assert!(matches!(graph.connect(r, r), Err(GraphError::SelfBond { .. })));

    let mut other = BondGraph::new();
    for name in ["a", "b", "c", "d"] {
        other.add_zero_junction(name).unwrap();
    }
    let foreign = other.node_by_name("d").unwrap();
    assert!(matches!(
        graph.connect(j, foreign),
        Err(GraphError::UnknownNode { .. })
    ));

    // Parameter validation belongs to the element.
    assert!(Resistor::new("bad", -1.0).is_err());

    assert!(matches!(
        graph.assign_causalities(),
        Err(GraphError::UnbondedNode { .. })
    ));
    graph.connect(j, r).unwrap();
    assert!(graph.bonds().len() == 1);
}

#[test]
fn equation_assembly_is_idempotent() {
    let mut graph = series_rc();
    graph.assign_causalities().unwrap();
    let first = graph.equations().unwrap();
    let second = graph.equations().unwrap();
    assert_eq!(first, second);
    assert_eq!(graph.state_equations().unwrap(), graph.state_equations().unwrap());
}

#[test]
fn assignment_is_deterministic_across_builds_and_resets() {
    let mut a = series_rc();
    let mut b = series_rc();
    let report_a = a.assign_causalities().unwrap();
    let report_b = b.assign_causalities().unwrap();
    assert_eq!(flags(&a), flags(&b));
    assert_eq!(report_a, report_b);

    let before = flags(&a);
    a.reset_causalities();
    assert!(flags(&a).iter().all(Option::is_none));
    assert_eq!(a.assign_causalities().unwrap(), report_a);
    assert_eq!(flags(&a), before);
}

#[test]
fn relief_valve_vents_an_accumulator() {
    // Sf:pump -> 0 -> C:acc, 0 -> RV:relief
    let mut graph = BondGraph::new();
    let pump = graph.add_one_port(FlowSource::new("pump")).unwrap();
    let rail = graph.add_zero_junction("rail").unwrap();
    let acc = graph.add_one_port(Capacitor::new("acc", 2.0).unwrap()).unwrap();
    let relief = graph
        .add_one_port(ReliefValve::new("relief", 1.0, 100.0, 5.0, 10.0).unwrap())
        .unwrap();
    graph.connect(pump, rail).unwrap();
    graph.connect(rail, acc).unwrap();
    let b_rv = graph.connect(rail, relief).unwrap();

    let report = graph.assign_causalities().unwrap();
    assert!(report.preferred_causalities_valid());
    assert_eq!(graph.bond(b_rv).unwrap().effort_in_at(relief), Some(true));

    let system = graph.equations().unwrap();
    assert_eq!(system.equations.len(), 2);
    assert_eq!(system.parameters.len(), 5);

    // At the threshold (q / C = d) the valve passes d * (1/ro + 1/rc) / 2.
    let model = graph.state_equations().unwrap();
    let values = Bindings::from([(Symbol::new("F_pump"), 6.0), (Symbol::new("q_acc"), 20.0)]);
    let rates = model.derivatives(&values).unwrap();
    let vented = 10.0 * (1.0 / 1.0 + 1.0 / 100.0) / 2.0;
    assert!((rates[0] - (6.0 - vented)).abs() < 1e-9);
}

#[test]
fn dc_motor_stays_integral() {
    let mut graph = BondGraph::new();
    let u = graph.add_one_port(EffortSource::new("u")).unwrap();
    let el = graph.add_one_junction("el").unwrap();
    let ra = graph.add_one_port(Resistor::new("ra", 0.5).unwrap()).unwrap();
    let la = graph.add_one_port(Inertia::new("la", 0.01).unwrap()).unwrap();
    let gy = graph.add_two_port(Gyrator::new("km", 0.1).unwrap()).unwrap();
    let mech = graph.add_one_junction("mech").unwrap();
    let jm = graph.add_one_port(Inertia::new("jm", 0.02).unwrap()).unwrap();
    let bm = graph.add_one_port(Resistor::new("bm", 0.001).unwrap()).unwrap();
    graph.connect(u, el).unwrap();
    graph.connect(el, ra).unwrap();
    graph.connect(el, la).unwrap();
    let b_in = graph.connect(el, gy).unwrap();
    let b_out = graph.connect(gy, mech).unwrap();
    graph.connect(mech, jm).unwrap();
    graph.connect(mech, bm).unwrap();

    let report = graph.assign_causalities().unwrap();
    assert!(report.derivative.is_empty());
    assert!(report.arbitrary.is_empty());
    // A gyrator keeps the same causality at both ports.
    assert_eq!(
        graph.bond(b_in).unwrap().effort_in_at(gy),
        graph.bond(b_out).unwrap().effort_in_at(gy)
    );

    let model = graph.state_equations().unwrap();
    assert_eq!(
        model.states(),
        vec![Symbol::new("p_la"), Symbol::new("p_jm")]
    );
    let values = Bindings::from([
        (Symbol::new("E_u"), 12.0),
        (Symbol::new("p_la"), 0.0),
        (Symbol::new("p_jm"), 0.0),
    ]);
    let rates = model.derivatives(&values).unwrap();
    // At rest the full supply voltage drives the armature.
    assert!((rates[0] - 12.0).abs() < 1e-12);
    assert!(rates[1].abs() < 1e-12);
}
