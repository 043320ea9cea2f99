//! Topology validation.
//!
//! Connection rules are checked when a bond is added, so an invalid bond
//! never enters the graph. Completeness (every port bonded) can only be
//! judged once construction is over and is checked before analysis.

use bg_core::NodeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::{BondGraph, NodeKind};

pub(crate) fn check_name(graph: &BondGraph, name: &str) -> GraphResult<()> {
    if name.trim().is_empty() {
        return Err(GraphError::EmptyName);
    }
    if graph.names.contains_key(name) {
        return Err(GraphError::DuplicateName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn node_exists(graph: &BondGraph, node: NodeId) -> GraphResult<()> {
    if graph.node(node).is_none() {
        return Err(GraphError::UnknownNode { node });
    }
    Ok(())
}

/// Validate a prospective bond `from` -> `to` against the existing graph.
pub(crate) fn check_connection(graph: &BondGraph, from: NodeId, to: NodeId) -> GraphResult<()> {
    node_exists(graph, from)?;
    node_exists(graph, to)?;

    if from == to {
        return Err(GraphError::SelfBond {
            node: graph.node_name(from).to_string(),
        });
    }

    check_port_free(graph, from, false)?;
    check_port_free(graph, to, true)?;
    Ok(())
}

fn check_port_free(graph: &BondGraph, node: NodeId, incoming: bool) -> GraphResult<()> {
    let Some(n) = graph.node(node) else {
        return Err(GraphError::UnknownNode { node });
    };
    let bonds = graph.node_bonds(node);
    match &n.kind {
        NodeKind::OnePort(_) if !bonds.is_empty() => Err(GraphError::PortAlreadyBonded {
            node: n.name.clone(),
            what: "one-port elements take exactly one bond",
        }),
        NodeKind::TwoPort(_) => {
            let (port1, port2) = graph.two_port_bonds(node);
            if incoming && port1.is_some() {
                Err(GraphError::PortAlreadyBonded {
                    node: n.name.clone(),
                    what: "port 1 (incoming bond) is already connected",
                })
            } else if !incoming && port2.is_some() {
                Err(GraphError::PortAlreadyBonded {
                    node: n.name.clone(),
                    what: "port 2 (outgoing bond) is already connected",
                })
            } else {
                Ok(())
            }
        }
        _ => Ok(()),
    }
}

/// Every element port must be bonded before analysis can start.
pub(crate) fn check_complete(graph: &BondGraph) -> GraphResult<()> {
    for node in graph.nodes() {
        let bonds = graph.node_bonds(node.id);
        let what = match &node.kind {
            NodeKind::OnePort(_) if bonds.len() != 1 => "one-port element has no bond",
            NodeKind::TwoPort(_) => {
                let (port1, port2) = graph.two_port_bonds(node.id);
                if port1.is_none() || port2.is_none() {
                    "two-port element needs one incoming and one outgoing bond"
                } else {
                    continue;
                }
            }
            NodeKind::Junction(_) if bonds.is_empty() => "junction has no bonds",
            _ => continue,
        };
        return Err(GraphError::UnbondedNode {
            node: node.name.clone(),
            what,
        });
    }
    Ok(())
}
