//! Reduction of the assembled system to explicit state equations.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bg_core::Real;
use bg_symbolic::{Bindings, Expr, StateEquation, Substitution, Symbol};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::BondGraph;

/// Explicit first-order model `dx/dt = F(x, u, p)`.
///
/// Right-hand sides mention only states, source inputs and parameters, plus
/// opaque `d(..)/dt` markers where a storage element sits in derivative
/// causality.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    pub equations: Vec<StateEquation>,
    pub inputs: BTreeSet<Symbol>,
    pub parameters: BTreeMap<Symbol, Real>,
}

impl StateSpace {
    pub fn states(&self) -> Vec<Symbol> {
        self.equations.iter().map(|eq| eq.state.clone()).collect()
    }

    /// Evaluate every right-hand side.
    ///
    /// `values` supplies states and inputs; parameters default to their
    /// declared values and may be overridden through `values`.
    pub fn derivatives(&self, values: &Bindings) -> GraphResult<Vec<Real>> {
        let mut bindings = self.parameters.clone();
        bindings.extend(values.iter().map(|(s, v)| (s.clone(), *v)));
        self.equations
            .iter()
            .map(|eq| eq.rhs.eval(&bindings).map_err(GraphError::from))
            .collect()
    }
}

impl fmt::Display for StateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for eq in &self.equations {
            writeln!(f, "{eq}")?;
        }
        Ok(())
    }
}

/// Depth-first resolver over explicit definitions.
struct Resolver<'a> {
    definitions: &'a BTreeMap<Symbol, Expr>,
    resolved: BTreeMap<Symbol, Expr>,
    visiting: BTreeSet<Symbol>,
}

impl Resolver<'_> {
    fn expr(&mut self, expr: &Expr) -> GraphResult<Expr> {
        let mut map = Substitution::new();
        for symbol in expr.free_symbols() {
            if self.definitions.contains_key(&symbol) {
                let value = self.symbol(&symbol)?;
                map.insert(symbol, value);
            }
        }
        if map.is_empty() {
            return Ok(expr.clone());
        }
        Ok(expr.substitute(&map))
    }

    fn symbol(&mut self, symbol: &Symbol) -> GraphResult<Expr> {
        if let Some(done) = self.resolved.get(symbol) {
            return Ok(done.clone());
        }
        let definitions = self.definitions;
        let Some(rhs) = definitions.get(symbol) else {
            return Ok(Expr::sym(symbol));
        };
        if !self.visiting.insert(symbol.clone()) {
            return Err(GraphError::AlgebraicLoop {
                what: format!("{symbol} depends on itself"),
            });
        }
        let value = self.expr(rhs)?;
        self.visiting.remove(symbol);
        self.resolved.insert(symbol.clone(), value.clone());
        Ok(value)
    }
}

impl BondGraph {
    /// Eliminate every bond variable from the state equations.
    pub fn state_equations(&self) -> GraphResult<StateSpace> {
        let system = self.equations()?;

        let mut definitions = BTreeMap::new();
        for eq in system.algebraic() {
            if definitions.insert(eq.lhs.clone(), eq.rhs.clone()).is_some() {
                return Err(GraphError::DuplicateDefinition {
                    symbol: eq.lhs.to_string(),
                });
            }
        }

        let mut resolver = Resolver {
            definitions: &definitions,
            resolved: BTreeMap::new(),
            visiting: BTreeSet::new(),
        };
        let mut equations = Vec::with_capacity(system.state_equations.len());
        for eq in &system.state_equations {
            equations.push(StateEquation::new(&eq.state, resolver.expr(&eq.rhs)?));
        }

        debug!(states = equations.len(), "state equations reduced");
        Ok(StateSpace {
            equations,
            inputs: system.input_symbols(),
            parameters: system.parameters,
        })
    }
}
