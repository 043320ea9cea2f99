//! Core traits for element models.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{ElementError, ElementResult};
use bg_core::numeric::Real;
use bg_symbolic::{Equation, StateEquation, Symbol};

/// Causality requirement an element places on its port.
///
/// All variants are stated from the element's side of the bond: "effort in"
/// means the element receives effort and computes flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Causality {
    /// Effort must be the element's input (flow sources, relief valves).
    FixedEffortIn,
    /// Flow must be the element's input (effort sources).
    FixedFlowIn,
    /// Integral causality of an inertia: effort in, if the graph allows it.
    PreferEffortIn,
    /// Integral causality of a capacitor: flow in, if the graph allows it.
    PreferFlowIn,
    /// Constitutive law invertible either way.
    Undetermined,
}

impl Causality {
    /// Whether effort enters the element under this policy, if it says anything.
    pub fn effort_in(self) -> Option<bool> {
        match self {
            Causality::FixedEffortIn | Causality::PreferEffortIn => Some(true),
            Causality::FixedFlowIn | Causality::PreferFlowIn => Some(false),
            Causality::Undetermined => None,
        }
    }

    pub fn is_fixed(self) -> bool {
        matches!(self, Causality::FixedEffortIn | Causality::FixedFlowIn)
    }

    pub fn is_preferred(self) -> bool {
        matches!(self, Causality::PreferEffortIn | Causality::PreferFlowIn)
    }
}

/// Element variant tag, used for display labels and node categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    EffortSource,
    FlowSource,
    Resistor,
    ReliefValve,
    Capacitor,
    Inertia,
    Transformer,
    Gyrator,
}

impl ElementKind {
    /// Conventional bond-graph prefix (`Se`, `R`, `TF`...).
    pub fn prefix(self) -> &'static str {
        match self {
            ElementKind::EffortSource => "Se",
            ElementKind::FlowSource => "Sf",
            ElementKind::Resistor => "R",
            ElementKind::ReliefValve => "RV",
            ElementKind::Capacitor => "C",
            ElementKind::Inertia => "I",
            ElementKind::Transformer => "TF",
            ElementKind::Gyrator => "GY",
        }
    }
}

/// A named physical constant with its numeric value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub symbol: Symbol,
    pub value: Real,
}

/// The power variables of one bond, seen from one of its endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub effort: Symbol,
    pub flow: Symbol,
    /// `Some(true)` when effort enters the element through this port;
    /// `None` while the bond's causality is unassigned.
    pub effort_in: Option<bool>,
}

impl Port {
    pub fn new(effort: Symbol, flow: Symbol, effort_in: Option<bool>) -> Self {
        Self {
            effort,
            flow,
            effort_in,
        }
    }

    /// Resolved causality at this port, or an error naming the element.
    pub fn causality(&self, element: &str) -> ElementResult<bool> {
        self.effort_in
            .ok_or_else(|| ElementError::UndeterminedCausality {
                element: element.to_string(),
            })
    }

    /// Resolved causality, additionally checked against a hard policy.
    pub fn fixed_causality(&self, element: &str, policy: Causality) -> ElementResult<bool> {
        let effort_in = self.causality(element)?;
        if policy.is_fixed() && policy.effort_in() != Some(effort_in) {
            return Err(ElementError::CausalityMismatch {
                element: element.to_string(),
                what: "port causality differs from the element's fixed policy",
            });
        }
        Ok(effort_in)
    }
}

/// Trait for one-port elements attached to exactly one bond.
///
/// Elements are immutable parameter holders; all causality state lives on the
/// bond and is handed in through `Port`.
pub trait OnePortElement: fmt::Debug + Send + Sync {
    /// Element name, unique within a graph.
    fn name(&self) -> &str;

    fn kind(&self) -> ElementKind;

    /// Short display string such as `R:load`.
    fn visualization_label(&self) -> String {
        format!("{}:{}", self.kind().prefix(), self.name())
    }

    /// Causality the element requires or prefers at its port.
    ///
    /// A pure function of the element, never of graph state.
    fn causality_policy(&self) -> Causality;

    /// Constitutive equations, solved for the element's output variable.
    ///
    /// Fails with `UndeterminedCausality` while the port causality is unknown.
    fn equations(&self, port: &Port) -> ElementResult<Vec<Equation>>;

    /// Boundary bindings of externally supplied variables (sources only).
    fn input_equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        port.causality(self.name())?;
        Ok(Vec::new())
    }

    /// State equations for storage elements in integral causality.
    fn state_equations(&self, port: &Port) -> ElementResult<Vec<StateEquation>> {
        port.causality(self.name())?;
        Ok(Vec::new())
    }

    /// Declared physical constants.
    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    fn parameter_symbols(&self) -> BTreeSet<Symbol> {
        self.parameters().into_iter().map(|p| p.symbol).collect()
    }
}

/// How a two-port couples the causality of its ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoPortRule {
    /// Effort enters at exactly one port (transformer).
    Transfer,
    /// Both ports share the same causality (gyrator).
    Swap,
}

impl TwoPortRule {
    /// Causality implied at the other port given one port's causality.
    pub fn other(self, effort_in: bool) -> bool {
        match self {
            TwoPortRule::Transfer => !effort_in,
            TwoPortRule::Swap => effort_in,
        }
    }
}

/// Trait for two-port elements.
///
/// Port 1 is the bond pointing into the element, port 2 the bond leaving it.
pub trait TwoPortElement: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ElementKind;

    fn visualization_label(&self) -> String {
        format!("{}:{}", self.kind().prefix(), self.name())
    }

    fn rule(&self) -> TwoPortRule;

    fn equations(&self, port1: &Port, port2: &Port) -> ElementResult<Vec<Equation>>;

    fn parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    fn parameter_symbols(&self) -> BTreeSet<Symbol> {
        self.parameters().into_iter().map(|p| p.symbol).collect()
    }
}
