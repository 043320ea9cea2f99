//! Equation assembly over a causally complete graph.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bg_core::{BondId, NodeId, Real};
use bg_symbolic::{Equation, Expr, StateEquation, Symbol};
use tracing::info;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Bond, BondGraph, JunctionKind, NodeKind};

/// The symbolic system of a causally complete graph.
///
/// Every `Equation` is explicit: its left-hand side is the variable that
/// the owning node computes under the assigned causality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquationSystem {
    /// Constitutive laws of one-port and two-port elements, in node order.
    pub equations: Vec<Equation>,
    /// Junction balances and common-variable equalities, in node order.
    pub junction_equations: Vec<Equation>,
    /// Bond variables bound to external source inputs.
    pub inputs: Vec<Equation>,
    /// `d(x)/dt` relations of storage elements in integral causality.
    pub state_equations: Vec<StateEquation>,
    /// Declared physical constants and their numeric values.
    pub parameters: BTreeMap<Symbol, Real>,
}

impl EquationSystem {
    pub fn parameter_symbols(&self) -> BTreeSet<Symbol> {
        self.parameters.keys().cloned().collect()
    }

    /// External input symbols (the right-hand sides of `inputs`).
    pub fn input_symbols(&self) -> BTreeSet<Symbol> {
        self.inputs
            .iter()
            .flat_map(|eq| eq.rhs.free_symbols())
            .collect()
    }

    /// State symbols, in node order.
    pub fn states(&self) -> Vec<Symbol> {
        self.state_equations.iter().map(|eq| eq.state.clone()).collect()
    }

    /// Every algebraic equation: inputs, element laws, then junctions.
    pub fn algebraic(&self) -> impl Iterator<Item = &Equation> {
        self.inputs
            .iter()
            .chain(&self.equations)
            .chain(&self.junction_equations)
    }
}

impl fmt::Display for EquationSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections: [(&str, &[Equation]); 3] = [
            ("inputs", &self.inputs),
            ("elements", &self.equations),
            ("junctions", &self.junction_equations),
        ];
        for (title, equations) in sections {
            writeln!(f, "{title}:")?;
            for eq in equations {
                writeln!(f, "  {eq}")?;
            }
        }
        writeln!(f, "states:")?;
        for eq in &self.state_equations {
            writeln!(f, "  {eq}")?;
        }
        writeln!(f, "parameters:")?;
        for (symbol, value) in &self.parameters {
            writeln!(f, "  {symbol} = {value}")?;
        }
        Ok(())
    }
}

impl BondGraph {
    /// Collect the equations of every node, in insertion order.
    ///
    /// Requires every bond to carry a causality. Pure: repeated calls return
    /// equal systems.
    pub fn equations(&self) -> GraphResult<EquationSystem> {
        if let Some(bond) = self.bonds.iter().find(|b| !b.has_causality()) {
            return Err(GraphError::undetermined(bond.id));
        }

        let mut system = EquationSystem::default();
        let mut states = BTreeSet::new();

        for node in &self.nodes {
            match &node.kind {
                NodeKind::OnePort(element) => {
                    let Some(&bond) = self.node_bonds(node.id).first() else {
                        continue;
                    };
                    let port = self.bonds[bond.slot()].port(node.id);
                    system.inputs.extend(element.input_equations(&port)?);
                    system.equations.extend(element.equations(&port)?);
                    for eq in element.state_equations(&port)? {
                        if !states.insert(eq.state.clone()) {
                            return Err(GraphError::DuplicateStateSymbol {
                                symbol: eq.state.to_string(),
                            });
                        }
                        system.state_equations.push(eq);
                    }
                    for p in element.parameters() {
                        system.parameters.insert(p.symbol, p.value);
                    }
                }
                NodeKind::TwoPort(element) => {
                    let (Some(b1), Some(b2)) = self.two_port_bonds(node.id) else {
                        continue;
                    };
                    let port1 = self.bonds[b1.slot()].port(node.id);
                    let port2 = self.bonds[b2.slot()].port(node.id);
                    system.equations.extend(element.equations(&port1, &port2)?);
                    for p in element.parameters() {
                        system.parameters.insert(p.symbol, p.value);
                    }
                }
                NodeKind::Junction(kind) => {
                    system
                        .junction_equations
                        .extend(self.junction_equations(node.id, *kind)?);
                }
            }
        }

        info!(
            equations = system.equations.len(),
            junction_equations = system.junction_equations.len(),
            inputs = system.inputs.len(),
            states = system.state_equations.len(),
            "equations assembled"
        );
        Ok(system)
    }

    /// Balance and equality relations of one junction.
    ///
    /// The balance (flows at a 0-junction, efforts at a 1-junction) is solved
    /// for the determining bond, taking bonds pointing into the junction as
    /// positive. Every other bond's common variable equals the determining
    /// bond's.
    fn junction_equations(&self, node: NodeId, kind: JunctionKind) -> GraphResult<Vec<Equation>> {
        let det = kind.determining_effort_in();
        let bonds: Vec<&Bond> = self
            .node_bonds(node)
            .iter()
            .map(|&b| &self.bonds[b.slot()])
            .collect();

        let Some(k) = bonds.iter().position(|b| b.effort_in_at(node) == Some(det)) else {
            let bond = bonds.first().map_or(BondId::from_index(0), |b| b.id);
            return Err(GraphError::conflict(
                self.node_name(node),
                bond,
                "junction has no determining bond",
            ));
        };
        let (balanced, common) = split(kind, bonds[k]);
        let k_in = bonds[k].to == node;

        // x_k = -s_k * sum(s_j * x_j), s = +1 into the junction
        let terms = bonds
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != k)
            .map(|(_, b)| {
                let x = Expr::sym(split(kind, b).0);
                if (b.to == node) == k_in { -x } else { x }
            });
        let mut out = vec![Equation::new(balanced, Expr::sum(terms))];

        for (j, b) in bonds.iter().enumerate() {
            if j != k {
                out.push(Equation::new(split(kind, b).1, common));
            }
        }
        Ok(out)
    }
}

/// (balanced, common) variables of a bond at a junction.
fn split(kind: JunctionKind, bond: &Bond) -> (&Symbol, &Symbol) {
    match kind {
        JunctionKind::Zero => (&bond.flow, &bond.effort),
        JunctionKind::One => (&bond.effort, &bond.flow),
    }
}
