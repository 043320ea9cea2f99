//! Explicit equalities.

use std::fmt;

use crate::expr::{Expr, Substitution};
use crate::symbol::Symbol;

/// An explicit algebraic equality `lhs = rhs`.
///
/// The left-hand side is always the single symbol the equation computes,
/// which is what makes causal equations substitutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Symbol,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: &Symbol, rhs: impl Into<Expr>) -> Self {
        Self {
            lhs: lhs.clone(),
            rhs: rhs.into(),
        }
    }

    /// Substitute into the right-hand side only.
    pub fn substitute(&self, map: &Substitution) -> Self {
        Self {
            lhs: self.lhs.clone(),
            rhs: self.rhs.substitute(map),
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// A first-order state equation `d(state)/dt = rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEquation {
    pub state: Symbol,
    pub rhs: Expr,
}

impl StateEquation {
    pub fn new(state: &Symbol, rhs: impl Into<Expr>) -> Self {
        Self {
            state: state.clone(),
            rhs: rhs.into(),
        }
    }
}

impl fmt::Display for StateEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d({})/dt = {}", self.state, self.rhs)
    }
}
