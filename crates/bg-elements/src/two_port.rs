//! Power-conserving two-ports.

use crate::common::positive_parameter;
use crate::error::{ElementError, ElementResult};
use crate::traits::{ElementKind, Parameter, Port, TwoPortElement, TwoPortRule};
use bg_core::numeric::Real;
use bg_symbolic::{Equation, Expr};

/// Resolve both port causalities and check them against the coupling rule.
fn port_causalities(
    name: &str,
    rule: TwoPortRule,
    port1: &Port,
    port2: &Port,
) -> ElementResult<(bool, bool)> {
    let in1 = port1.causality(name)?;
    let in2 = port2.causality(name)?;
    if rule.other(in1) != in2 {
        return Err(ElementError::CausalityMismatch {
            element: name.to_string(),
            what: match rule {
                TwoPortRule::Transfer => "transformer ports must have opposite causality",
                TwoPortRule::Swap => "gyrator ports must have the same causality",
            },
        });
    }
    Ok((in1, in2))
}

/// Ideal transformer with modulus `m`: `e1 = m * e2`, `f2 = m * f1`.
#[derive(Debug, Clone)]
pub struct Transformer {
    name: String,
    ratio: Parameter,
}

impl Transformer {
    pub fn new(name: impl Into<String>, ratio: Real) -> ElementResult<Self> {
        let name = name.into();
        let ratio = positive_parameter("m", &name, ratio, "transformer ratio")?;
        Ok(Self { name, ratio })
    }
}

impl TwoPortElement for Transformer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Transformer
    }

    fn rule(&self) -> TwoPortRule {
        TwoPortRule::Transfer
    }

    fn equations(&self, port1: &Port, port2: &Port) -> ElementResult<Vec<Equation>> {
        let (in1, _) = port_causalities(&self.name, self.rule(), port1, port2)?;
        let m = Expr::from(&self.ratio.symbol);
        let eqs = if in1 {
            vec![
                Equation::new(&port2.effort, Expr::from(&port1.effort) / m.clone()),
                Equation::new(&port1.flow, Expr::from(&port2.flow) / m),
            ]
        } else {
            vec![
                Equation::new(&port1.effort, m.clone() * Expr::from(&port2.effort)),
                Equation::new(&port2.flow, m * Expr::from(&port1.flow)),
            ]
        };
        Ok(eqs)
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![self.ratio.clone()]
    }
}

/// Ideal gyrator with modulus `r`: `e1 = r * f2`, `e2 = r * f1`.
#[derive(Debug, Clone)]
pub struct Gyrator {
    name: String,
    ratio: Parameter,
}

impl Gyrator {
    pub fn new(name: impl Into<String>, ratio: Real) -> ElementResult<Self> {
        let name = name.into();
        let ratio = positive_parameter("r", &name, ratio, "gyrator ratio")?;
        Ok(Self { name, ratio })
    }
}

impl TwoPortElement for Gyrator {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Gyrator
    }

    fn rule(&self) -> TwoPortRule {
        TwoPortRule::Swap
    }

    fn equations(&self, port1: &Port, port2: &Port) -> ElementResult<Vec<Equation>> {
        let (in1, _) = port_causalities(&self.name, self.rule(), port1, port2)?;
        let r = Expr::from(&self.ratio.symbol);
        let eqs = if in1 {
            vec![
                Equation::new(&port2.flow, Expr::from(&port1.effort) / r.clone()),
                Equation::new(&port1.flow, Expr::from(&port2.effort) / r),
            ]
        } else {
            vec![
                Equation::new(&port1.effort, r.clone() * Expr::from(&port2.flow)),
                Equation::new(&port2.effort, r * Expr::from(&port1.flow)),
            ]
        };
        Ok(eqs)
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![self.ratio.clone()]
    }
}
