//! Linear dissipative one-port.

use crate::common::positive_parameter;
use crate::error::ElementResult;
use crate::traits::{Causality, ElementKind, OnePortElement, Parameter, Port};
use bg_core::numeric::Real;
use bg_symbolic::{Equation, Expr};

/// Linear resistor `e = R * f`, usable in either causality.
#[derive(Debug, Clone)]
pub struct Resistor {
    name: String,
    resistance: Parameter,
}

impl Resistor {
    /// Create a resistor; the resistance must be finite and positive.
    pub fn new(name: impl Into<String>, resistance: Real) -> ElementResult<Self> {
        let name = name.into();
        let resistance = positive_parameter("R", &name, resistance, "resistance")?;
        Ok(Self { name, resistance })
    }

    pub fn resistance(&self) -> &Parameter {
        &self.resistance
    }
}

impl OnePortElement for Resistor {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Resistor
    }

    fn causality_policy(&self) -> Causality {
        Causality::Undetermined
    }

    fn equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        let r = Expr::from(&self.resistance.symbol);
        let eq = if port.causality(&self.name)? {
            Equation::new(&port.flow, Expr::from(&port.effort) / r)
        } else {
            Equation::new(&port.effort, r * Expr::from(&port.flow))
        };
        Ok(vec![eq])
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![self.resistance.clone()]
    }
}
