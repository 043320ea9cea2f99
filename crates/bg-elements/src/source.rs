//! Ideal effort and flow sources.

use crate::error::ElementResult;
use crate::traits::{Causality, ElementKind, OnePortElement, Port};
use bg_symbolic::{Equation, Symbol};

/// Ideal effort source: imposes its input symbol on the bond's effort.
#[derive(Debug, Clone)]
pub struct EffortSource {
    name: String,
    input: Symbol,
}

impl EffortSource {
    /// Create a source whose input symbol is `E_<name>`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let input = Symbol::new(format!("E_{name}"));
        Self { name, input }
    }

    /// Use a caller-chosen input symbol.
    pub fn with_input(mut self, input: Symbol) -> Self {
        self.input = input;
        self
    }

    pub fn input(&self) -> &Symbol {
        &self.input
    }
}

impl OnePortElement for EffortSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::EffortSource
    }

    fn causality_policy(&self) -> Causality {
        Causality::FixedFlowIn
    }

    fn equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        port.fixed_causality(&self.name, self.causality_policy())?;
        Ok(Vec::new())
    }

    fn input_equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        port.fixed_causality(&self.name, self.causality_policy())?;
        Ok(vec![Equation::new(&port.effort, &self.input)])
    }
}

/// Ideal flow source: imposes its input symbol on the bond's flow.
#[derive(Debug, Clone)]
pub struct FlowSource {
    name: String,
    input: Symbol,
}

impl FlowSource {
    /// Create a source whose input symbol is `F_<name>`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let input = Symbol::new(format!("F_{name}"));
        Self { name, input }
    }

    pub fn with_input(mut self, input: Symbol) -> Self {
        self.input = input;
        self
    }

    pub fn input(&self) -> &Symbol {
        &self.input
    }
}

impl OnePortElement for FlowSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::FlowSource
    }

    fn causality_policy(&self) -> Causality {
        Causality::FixedEffortIn
    }

    fn equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        port.fixed_causality(&self.name, self.causality_policy())?;
        Ok(Vec::new())
    }

    fn input_equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        port.fixed_causality(&self.name, self.causality_policy())?;
        Ok(vec![Equation::new(&port.flow, &self.input)])
    }
}
