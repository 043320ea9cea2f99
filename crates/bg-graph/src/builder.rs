//! Incremental graph construction.

use bg_core::{BondId, NodeId};
use bg_elements::{OnePortElement, TwoPortElement};
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Bond, BondGraph, JunctionKind, Node, NodeKind, Phase};
use crate::validate;

impl BondGraph {
    /// Add a one-port element and return its node ID.
    ///
    /// The element's name becomes the node name and must be unique.
    pub fn add_one_port(&mut self, element: impl OnePortElement + 'static) -> GraphResult<NodeId> {
        self.add_boxed_one_port(Box::new(element))
    }

    pub fn add_boxed_one_port(&mut self, element: Box<dyn OnePortElement>) -> GraphResult<NodeId> {
        let name = element.name().to_string();
        self.push_node(name, NodeKind::OnePort(element))
    }

    /// Add a two-port element (transformer, gyrator).
    ///
    /// The bond pointing into the node becomes port 1, the bond leaving it
    /// port 2.
    pub fn add_two_port(&mut self, element: impl TwoPortElement + 'static) -> GraphResult<NodeId> {
        self.add_boxed_two_port(Box::new(element))
    }

    pub fn add_boxed_two_port(&mut self, element: Box<dyn TwoPortElement>) -> GraphResult<NodeId> {
        let name = element.name().to_string();
        self.push_node(name, NodeKind::TwoPort(element))
    }

    /// Add a junction with an arbitrary number of bonds.
    pub fn add_junction(&mut self, name: impl Into<String>, kind: JunctionKind) -> GraphResult<NodeId> {
        self.push_node(name.into(), NodeKind::Junction(kind))
    }

    pub fn add_zero_junction(&mut self, name: impl Into<String>) -> GraphResult<NodeId> {
        self.add_junction(name, JunctionKind::Zero)
    }

    pub fn add_one_junction(&mut self, name: impl Into<String>) -> GraphResult<NodeId> {
        self.add_junction(name, JunctionKind::One)
    }

    /// Connect two nodes with a bond directed `from` -> `to`.
    ///
    /// The bond number (and with it the `e_n`/`f_n` symbols) follows
    /// insertion order. Topology is frozen once causality has been assigned.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> GraphResult<BondId> {
        if self.phase != Phase::Building {
            return Err(GraphError::AnalysisStarted);
        }
        validate::check_connection(self, from, to)?;

        let id = BondId::from_index(self.bonds.len() as u32);
        self.bonds.push(Bond::new(id, from, to));
        self.node_bonds[from.slot()].push(id);
        self.node_bonds[to.slot()].push(id);

        debug!(
            bond = id.index() + 1,
            from = self.node_name(from),
            to = self.node_name(to),
            "bond added"
        );
        Ok(id)
    }

    /// Connect two nodes by name.
    pub fn connect_named(&mut self, from: &str, to: &str) -> GraphResult<BondId> {
        let lookup = |name: &str| {
            self.node_by_name(name)
                .ok_or_else(|| GraphError::UnknownName {
                    name: name.to_string(),
                })
        };
        let (from, to) = (lookup(from)?, lookup(to)?);
        self.connect(from, to)
    }

    fn push_node(&mut self, name: String, kind: NodeKind) -> GraphResult<NodeId> {
        if self.phase != Phase::Building {
            return Err(GraphError::AnalysisStarted);
        }
        validate::check_name(self, &name)?;

        let id = NodeId::from_index(self.nodes.len() as u32);
        self.names.insert(name.clone(), id);
        self.nodes.push(Node { id, name, kind });
        self.node_bonds.push(Vec::new());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_elements::{Capacitor, EffortSource, Resistor, Transformer};

    #[test]
    fn builder_basic() {
        let mut graph = BondGraph::new();
        let se = graph.add_one_port(EffortSource::new("se")).unwrap();
        let j = graph.add_one_junction("j").unwrap();
        let r = graph.add_one_port(Resistor::new("r", 2.0).unwrap()).unwrap();
        let b1 = graph.connect(se, j).unwrap();
        let b2 = graph.connect(j, r).unwrap();

        assert_eq!(se.index(), 0);
        assert_eq!(r.index(), 2);
        assert_eq!(b1.index(), 0);
        assert_eq!(b2.index(), 1);
        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.bonds().len(), 2);
        assert_eq!(graph.node_bonds(j), &[b1, b2]);
        assert_eq!(graph.node_by_name("r"), Some(r));
        assert_eq!(graph.bonds()[1].effort.name(), "e_2");
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut graph = BondGraph::new();
        graph.add_zero_junction("a").unwrap();
        let err = graph
            .add_one_port(Capacitor::new("a", 1.0).unwrap())
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateName { name: "a".into() });
        assert_eq!(graph.nodes().len(), 1);
    }

    #[test]
    fn empty_name_rejected() {
        let mut graph = BondGraph::new();
        assert_eq!(graph.add_one_junction(""), Err(GraphError::EmptyName));
    }

    #[test]
    fn connect_by_name() {
        let mut graph = BondGraph::new();
        graph.add_one_port(EffortSource::new("se")).unwrap();
        graph.add_two_port(Transformer::new("tf", 2.0).unwrap()).unwrap();
        let b = graph.connect_named("se", "tf").unwrap();
        assert_eq!(graph.bond(b).unwrap().to, graph.node_by_name("tf").unwrap());
        assert!(matches!(
            graph.connect_named("se", "missing"),
            Err(GraphError::UnknownName { .. })
        ));
    }
}
