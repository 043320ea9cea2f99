//! Read-only snapshot for diagram renderers.
//!
//! A renderer needs nodes, bond endpoints and the resolved causality flag to
//! draw half-arrows and causal strokes; it never sees equations.

use bg_core::{BondId, NodeId};

use crate::graph::{BondGraph, NodeCategory};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeView {
    pub id: NodeId,
    pub name: String,
    pub label: String,
    pub category: NodeCategory,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BondView {
    pub id: BondId,
    pub number: u32,
    pub from: NodeId,
    pub to: NodeId,
    pub effort: String,
    pub flow: String,
    /// `None` until causality is assigned.
    pub effort_in_at_to: Option<bool>,
    /// Node at the effort-input end, where the stroke is drawn.
    pub causal_stroke: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub bonds: Vec<BondView>,
}

impl GraphView {
    pub fn node(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

impl BondGraph {
    /// Snapshot of topology and current causality.
    pub fn view(&self) -> GraphView {
        let nodes = self
            .nodes
            .iter()
            .map(|node| NodeView {
                id: node.id,
                name: node.name.clone(),
                label: node.visualization_label(),
                category: node.category(),
            })
            .collect();
        let bonds = self
            .bonds
            .iter()
            .map(|bond| BondView {
                id: bond.id,
                number: bond.number(),
                from: bond.from,
                to: bond.to,
                effort: bond.effort.to_string(),
                flow: bond.flow.to_string(),
                effort_in_at_to: bond.effort_in_at_to,
                causal_stroke: bond.causal_stroke(),
            })
            .collect();
        GraphView { nodes, bonds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_elements::{Capacitor, FlowSource};

    #[test]
    fn view_tracks_causality() {
        let mut graph = BondGraph::new();
        let sf = graph.add_one_port(FlowSource::new("pump")).unwrap();
        let j = graph.add_zero_junction("p1").unwrap();
        let c = graph.add_one_port(Capacitor::new("acc", 1e-3).unwrap()).unwrap();
        graph.connect(sf, j).unwrap();
        graph.connect(j, c).unwrap();

        let before = graph.view();
        assert_eq!(before.nodes.len(), 3);
        assert_eq!(before.node(sf).unwrap().label, "Sf:pump");
        assert_eq!(before.node(j).unwrap().label, "0");
        assert_eq!(before.node(c).unwrap().category, NodeCategory::Storage);
        assert!(before.bonds.iter().all(|b| b.causal_stroke.is_none()));

        graph.assign_causalities().unwrap();
        let after = graph.view();
        assert_eq!(after.bonds[0].effort, "e_1");
        // The pump imposes flow, so effort enters the pump.
        assert_eq!(after.bonds[0].causal_stroke, Some(sf));
        // The accumulator integrates flow and sets the common effort.
        assert_eq!(after.bonds[1].causal_stroke, Some(j));
    }
}
