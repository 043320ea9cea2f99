//! Pressure relief valve with a smooth opening characteristic.

use crate::common::{finite_parameter, positive_parameter};
use crate::error::ElementResult;
use crate::traits::{Causality, ElementKind, OnePortElement, Parameter, Port};
use bg_core::numeric::Real;
use bg_symbolic::{Equation, Expr};

/// Nonlinear dissipative one-port that opens around a cracking effort.
///
/// The law is `f = e / R(e)`, where the conductance `1 / R(e)` moves from
/// `1 / rc` (closed) to `1 / ro` (open) through the switch
/// `s(e) = (1 + tanh(k * (e - d))) / 2`:
///
/// ```text
/// 1 / R(e) = s(e) / ro + (1 - s(e)) / rc
/// ```
///
/// The tanh switch keeps the law smooth, so the resulting equations remain
/// differentiable everywhere. At `e = d` the conductance is exactly halfway
/// between the two regimes. The law is only explicit in flow, so the valve
/// requires effort as its input.
#[derive(Debug, Clone)]
pub struct ReliefValve {
    name: String,
    r_open: Parameter,
    r_closed: Parameter,
    steepness: Parameter,
    threshold: Parameter,
}

impl ReliefValve {
    /// Create a valve from open/closed resistances, switch steepness and
    /// cracking effort.
    pub fn new(
        name: impl Into<String>,
        r_open: Real,
        r_closed: Real,
        steepness: Real,
        threshold: Real,
    ) -> ElementResult<Self> {
        let name = name.into();
        let r_open = positive_parameter("ro", &name, r_open, "open resistance")?;
        let r_closed = positive_parameter("rc", &name, r_closed, "closed resistance")?;
        let steepness = positive_parameter("k", &name, steepness, "steepness")?;
        let threshold = finite_parameter("d", &name, threshold, "threshold")?;
        Ok(Self {
            name,
            r_open,
            r_closed,
            steepness,
            threshold,
        })
    }

    /// Opening fraction `s(e)` in `[0, 1]`.
    pub fn opening(&self, effort: Expr) -> Expr {
        let k = Expr::from(&self.steepness.symbol);
        let d = Expr::from(&self.threshold.symbol);
        (Expr::one() + Expr::tanh(k * (effort - d))) / Expr::constant(2.0)
    }

    /// Effective resistance `R(e)`.
    pub fn blended_resistance(&self, effort: Expr) -> Expr {
        let s = self.opening(effort);
        let conductance = s.clone() / Expr::from(&self.r_open.symbol)
            + (Expr::one() - s) / Expr::from(&self.r_closed.symbol);
        Expr::one() / conductance
    }
}

impl OnePortElement for ReliefValve {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ElementKind {
        ElementKind::ReliefValve
    }

    fn causality_policy(&self) -> Causality {
        Causality::FixedEffortIn
    }

    fn equations(&self, port: &Port) -> ElementResult<Vec<Equation>> {
        port.fixed_causality(&self.name, self.causality_policy())?;
        let e = Expr::from(&port.effort);
        let r = self.blended_resistance(e.clone());
        Ok(vec![Equation::new(&port.flow, e / r)])
    }

    fn parameters(&self) -> Vec<Parameter> {
        vec![
            self.r_open.clone(),
            self.r_closed.clone(),
            self.steepness.clone(),
            self.threshold.clone(),
        ]
    }
}
