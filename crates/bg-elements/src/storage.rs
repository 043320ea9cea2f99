//! Energy-storing one-ports.
//!
//! Both elements prefer integral causality, where the element's state is the
//! time integral of its input and the output follows algebraically from the
//! state. When the graph forces derivative causality they fall back to a
//! relation containing a time-derivative marker and contribute no state.

use crate::common::positive_parameter;
use crate::error::ElementResult;
use crate::traits::{Causality, ElementKind, OnePortElement, Parameter, Port};
use bg_core::numeric::Real;
use bg_symbolic::{Equation, Expr, StateEquation, Symbol};

/// Capacitive storage with displacement state `q`: `e = q / C`, `dq/dt = f`.
#[derive(Debug, Clone)]
pub struct Capacitor {
    name: String,
    capacitance: Parameter,
    state: Symbol,
}

impl Capacitor {
    pub fn new(name: impl Into<String>, capacitance: Real) -> ElementResult<Self> {
        let name = name.into();
        let capacitance = positive_parameter("C", &name, capacitance, "capacitance")?;
        let state = Symbol::new(format!("q_{name}"));
        Ok(Self {
            name,
            capacitance,
            state,
        })
    }

    pub fn state(&self) -> &Symbol {
        &self.state
    }
}

impl OnePortElement for Capacitor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Capacitor
    }

    fn causality_policy(&self) -> Causality {
        Causality::PreferFlowIn
    }

    fn equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        let c = Expr::from(&self.capacitance.symbol);
        let eq = if port.causality(&self.name)? {
            // derivative causality: f = C * de/dt
            Equation::new(&port.flow, c * Expr::derivative(&port.effort))
        } else {
            Equation::new(&port.effort, Expr::from(&self.state) / c)
        };
        Ok(vec![eq])
    }

    fn state_equations(&self, port: &Port) -> ElementResult<Vec<StateEquation>> {
        if port.causality(&self.name)? {
            return Ok(Vec::new());
        }
        Ok(vec![StateEquation::new(&self.state, &port.flow)])
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![self.capacitance.clone()]
    }
}

/// Inertial storage with momentum state `p`: `f = p / I`, `dp/dt = e`.
#[derive(Debug, Clone)]
pub struct Inertia {
    name: String,
    inertance: Parameter,
    state: Symbol,
}

impl Inertia {
    pub fn new(name: impl Into<String>, inertance: Real) -> ElementResult<Self> {
        let name = name.into();
        let inertance = positive_parameter("I", &name, inertance, "inertance")?;
        let state = Symbol::new(format!("p_{name}"));
        Ok(Self {
            name,
            inertance,
            state,
        })
    }

    pub fn state(&self) -> &Symbol {
        &self.state
    }
}

impl OnePortElement for Inertia {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Inertia
    }

    fn causality_policy(&self) -> Causality {
        Causality::PreferEffortIn
    }

    fn equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        let i = Expr::from(&self.inertance.symbol);
        let eq = if port.causality(&self.name)? {
            Equation::new(&port.flow, Expr::from(&self.state) / i)
        } else {
            // derivative causality: e = I * df/dt
            Equation::new(&port.effort, i * Expr::derivative(&port.flow))
        };
        Ok(vec![eq])
    }

    fn state_equations(&self, port: &Port) -> ElementResult<Vec<StateEquation>> {
        if !port.causality(&self.name)? {
            return Ok(Vec::new());
        }
        Ok(vec![StateEquation::new(&self.state, &port.effort)])
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![self.inertance.clone()]
    }
}
