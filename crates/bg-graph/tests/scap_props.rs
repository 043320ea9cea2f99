//! Property tests for causality assignment over random junction trees.

use bg_core::NodeId;
use bg_elements::{Capacitor, Causality, EffortSource, FlowSource, Inertia, Resistor};
use bg_graph::{BondGraph, GraphError, JunctionKind, NodeKind};
use proptest::prelude::*;

/// A junction tree with one-port elements hanging off the junctions.
#[derive(Debug, Clone)]
struct Model {
    /// (is 0-junction, parent seed, bond points to parent)
    junctions: Vec<(bool, usize, bool)>,
    /// (junction seed, element kind, bond points to element)
    elements: Vec<(usize, u8, bool)>,
}

fn model() -> impl Strategy<Value = Model> {
    (
        prop::collection::vec((any::<bool>(), any::<usize>(), any::<bool>()), 1..6),
        prop::collection::vec((any::<usize>(), 0u8..5, any::<bool>()), 1..9),
    )
        .prop_map(|(junctions, elements)| Model {
            junctions,
            elements,
        })
}

fn build(model: &Model) -> BondGraph {
    let mut graph = BondGraph::new();
    let mut junctions: Vec<NodeId> = Vec::new();
    for (i, &(zero, parent, to_parent)) in model.junctions.iter().enumerate() {
        let kind = if zero { JunctionKind::Zero } else { JunctionKind::One };
        let j = graph.add_junction(format!("j{i}"), kind).unwrap();
        if i > 0 {
            let p = junctions[parent % i];
            if to_parent {
                graph.connect(j, p).unwrap();
            } else {
                graph.connect(p, j).unwrap();
            }
        }
        junctions.push(j);
    }
    for (i, &(seed, kind, to_element)) in model.elements.iter().enumerate() {
        let name = format!("e{i}");
        let e = match kind {
            0 => graph.add_one_port(EffortSource::new(name)),
            1 => graph.add_one_port(FlowSource::new(name)),
            2 => graph.add_one_port(Resistor::new(name, 1.0).unwrap()),
            3 => graph.add_one_port(Capacitor::new(name, 1.0).unwrap()),
            _ => graph.add_one_port(Inertia::new(name, 1.0).unwrap()),
        }
        .unwrap();
        let j = junctions[seed % junctions.len()];
        if to_element {
            graph.connect(j, e).unwrap();
        } else {
            graph.connect(e, j).unwrap();
        }
    }
    graph
}

fn flags(graph: &BondGraph) -> Vec<Option<bool>> {
    graph.bonds().iter().map(|b| b.effort_in_at_to).collect()
}

proptest! {
    #[test]
    fn assignment_is_deterministic(m in model()) {
        let mut a = build(&m);
        let mut b = build(&m);
        prop_assert_eq!(a.assign_causalities(), b.assign_causalities());
        prop_assert_eq!(flags(&a), flags(&b));
    }

    #[test]
    fn success_is_complete_and_consistent(m in model()) {
        let mut graph = build(&m);
        let Ok(report) = graph.assign_causalities() else {
            return Ok(());
        };
        prop_assert!(graph.all_causalities_set());

        for node in graph.nodes() {
            let bonds = graph.node_bonds(node.id);
            match &node.kind {
                NodeKind::Junction(kind) => {
                    let det = kind.determining_effort_in();
                    let count = bonds
                        .iter()
                        .filter(|&&b| graph.bond(b).unwrap().effort_in_at(node.id) == Some(det))
                        .count();
                    prop_assert_eq!(count, 1, "junction {}", node.name);
                }
                NodeKind::OnePort(element) => {
                    let policy = element.causality_policy();
                    let actual = graph.bond(bonds[0]).unwrap().effort_in_at(node.id);
                    if policy.is_fixed() {
                        prop_assert_eq!(actual, policy.effort_in());
                    }
                    if policy.is_preferred() && actual != policy.effort_in() {
                        prop_assert!(report.derivative.contains(&node.id));
                    }
                }
                NodeKind::TwoPort(_) => {}
            }
        }

        let system = graph.equations().unwrap();
        let storages = graph
            .nodes()
            .iter()
            .filter(|n| matches!(n.causality_policy(), Some(Causality::PreferEffortIn | Causality::PreferFlowIn)))
            .count();
        prop_assert_eq!(system.state_equations.len(), storages - report.derivative.len());
    }

    #[test]
    fn failure_assigns_nothing(m in model()) {
        let mut graph = build(&m);
        if let Err(err) = graph.assign_causalities() {
            let is_conflict = matches!(err, GraphError::CausalityConflict { .. });
            prop_assert!(is_conflict, "unexpected error {}", err);
            prop_assert!(flags(&graph).iter().all(Option::is_none));
        }
    }
}
