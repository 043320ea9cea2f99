//! Core graph data structures.

use std::collections::HashMap;

use bg_core::{BondId, NodeId};
use bg_elements::{Causality, ElementKind, OnePortElement, Port, TwoPortElement};
use bg_symbolic::Symbol;

/// Ideal junction flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JunctionKind {
    /// 0-junction: common effort, flows sum to zero.
    Zero,
    /// 1-junction: common flow, efforts sum to zero.
    One,
}

impl JunctionKind {
    /// Causality (effort in, seen from the junction) of the single bond that
    /// determines the junction's common variable.
    ///
    /// A 0-junction receives its common effort through exactly one bond; a
    /// 1-junction receives its common flow through exactly one bond, which is
    /// the bond whose effort leaves the junction.
    pub fn determining_effort_in(self) -> bool {
        match self {
            JunctionKind::Zero => true,
            JunctionKind::One => false,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            JunctionKind::Zero => "0",
            JunctionKind::One => "1",
        }
    }
}

/// What a node is.
///
/// Dispatch over element behaviour happens through the element traits; the
/// enum only separates the three structural roles.
#[derive(Debug)]
pub enum NodeKind {
    OnePort(Box<dyn OnePortElement>),
    TwoPort(Box<dyn TwoPortElement>),
    Junction(JunctionKind),
}

/// Coarse node category for renderers and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeCategory {
    Source,
    Resistor,
    Storage,
    TwoPort,
    Junction0,
    Junction1,
}

/// A vertex of the bond graph: an element or a junction.
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    /// Short display string (`R:load`, `0`, `TF:gear`).
    pub fn visualization_label(&self) -> String {
        match &self.kind {
            NodeKind::OnePort(element) => element.visualization_label(),
            NodeKind::TwoPort(element) => element.visualization_label(),
            NodeKind::Junction(kind) => kind.symbol().to_string(),
        }
    }

    pub fn category(&self) -> NodeCategory {
        let kind = match &self.kind {
            NodeKind::OnePort(element) => element.kind(),
            NodeKind::TwoPort(element) => element.kind(),
            NodeKind::Junction(JunctionKind::Zero) => return NodeCategory::Junction0,
            NodeKind::Junction(JunctionKind::One) => return NodeCategory::Junction1,
        };
        match kind {
            ElementKind::EffortSource | ElementKind::FlowSource => NodeCategory::Source,
            ElementKind::Resistor | ElementKind::ReliefValve => NodeCategory::Resistor,
            ElementKind::Capacitor | ElementKind::Inertia => NodeCategory::Storage,
            ElementKind::Transformer | ElementKind::Gyrator => NodeCategory::TwoPort,
        }
    }

    /// Element-level causality policy; `None` for junctions and two-ports.
    pub fn causality_policy(&self) -> Option<Causality> {
        match &self.kind {
            NodeKind::OnePort(element) => Some(element.causality_policy()),
            NodeKind::TwoPort(_) | NodeKind::Junction(_) => None,
        }
    }

    pub fn junction_kind(&self) -> Option<JunctionKind> {
        match self.kind {
            NodeKind::Junction(kind) => Some(kind),
            _ => None,
        }
    }
}

/// A directed bond carrying the power variables `e_n` and `f_n`.
///
/// The direction (`from` -> `to`) is the positive power direction. The
/// causality flag is `Some(true)` when effort is the input at `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bond {
    pub id: BondId,
    pub from: NodeId,
    pub to: NodeId,
    pub effort_in_at_to: Option<bool>,
    pub effort: Symbol,
    pub flow: Symbol,
}

impl Bond {
    pub(crate) fn new(id: BondId, from: NodeId, to: NodeId) -> Self {
        let number = id.index() + 1;
        Self {
            id,
            from,
            to,
            effort_in_at_to: None,
            effort: Symbol::new(format!("e_{number}")),
            flow: Symbol::new(format!("f_{number}")),
        }
    }

    /// 1-based bond number, as used in the symbol names.
    pub fn number(&self) -> u32 {
        self.id.index() + 1
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    pub fn has_causality(&self) -> bool {
        self.effort_in_at_to.is_some()
    }

    /// Whether effort enters `node` through this bond.
    ///
    /// `None` while unassigned or when `node` is not an endpoint.
    pub fn effort_in_at(&self, node: NodeId) -> Option<bool> {
        let at_to = self.effort_in_at_to?;
        if node == self.to {
            Some(at_to)
        } else if node == self.from {
            Some(!at_to)
        } else {
            None
        }
    }

    /// The endpoint where the causal stroke is drawn (the effort-input end).
    pub fn causal_stroke(&self) -> Option<NodeId> {
        self.effort_in_at_to
            .map(|at_to| if at_to { self.to } else { self.from })
    }

    /// The bond's power variables seen from `node`.
    pub fn port(&self, node: NodeId) -> Port {
        Port::new(self.effort.clone(), self.flow.clone(), self.effort_in_at(node))
    }
}

/// Analysis phase of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    #[default]
    Building,
    Assigned,
}

/// The bond graph: an arena of nodes addressed by `NodeId` and a list of
/// bonds holding node handles.
///
/// Insertion order of nodes and bonds is significant: every scan of the
/// causality assignment follows it, which makes the analysis deterministic.
#[derive(Debug, Default)]
pub struct BondGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) bonds: Vec<Bond>,

    /// Back-references: bonds incident to each node, in bond order.
    pub(crate) node_bonds: Vec<Vec<BondId>>,

    pub(crate) names: HashMap<String, NodeId>,
    pub(crate) phase: Phase,
}

impl BondGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return all nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return all bonds in insertion order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Get a node by ID (returns None if ID out of bounds).
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.slot())
    }

    /// Get a bond by ID (returns None if ID out of bounds).
    pub fn bond(&self, id: BondId) -> Option<&Bond> {
        self.bonds.get(id.slot())
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Bonds incident to a node, in bond order.
    pub fn node_bonds(&self, id: NodeId) -> &[BondId] {
        self.node_bonds.get(id.slot()).map_or(&[], Vec::as_slice)
    }

    /// True once every bond carries a causality.
    pub fn all_causalities_set(&self) -> bool {
        self.bonds.iter().all(Bond::has_causality)
    }

    /// Clear every causality flag so the graph can be analysed again.
    pub fn reset_causalities(&mut self) {
        for bond in &mut self.bonds {
            bond.effort_in_at_to = None;
        }
        self.phase = Phase::Building;
    }

    pub(crate) fn node_name(&self, id: NodeId) -> &str {
        self.node(id).map_or("?", |n| n.name.as_str())
    }

    /// Port 1 (incoming) and port 2 (outgoing) bonds of a two-port node.
    pub(crate) fn two_port_bonds(&self, id: NodeId) -> (Option<BondId>, Option<BondId>) {
        let mut port1 = None;
        let mut port2 = None;
        for &b in self.node_bonds(id) {
            let bond = &self.bonds[b.slot()];
            if bond.to == id {
                port1 = Some(b);
            } else if bond.from == id {
                port2 = Some(b);
            }
        }
        (port1, port2)
    }
}
