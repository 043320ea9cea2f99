//! Graphviz rendering of a graph snapshot.
//!
//! Bonds are drawn as half-arrows in the power direction. Once causality is
//! known a tee marks the effort-input end.

use std::fmt::Write;

use bg_graph::{GraphView, NodeCategory};

fn shape(category: NodeCategory) -> &'static str {
    match category {
        NodeCategory::Junction0 | NodeCategory::Junction1 => "circle",
        NodeCategory::TwoPort => "box",
        NodeCategory::Source | NodeCategory::Resistor | NodeCategory::Storage => "plaintext",
    }
}

pub fn render(view: &GraphView) -> String {
    let mut out = String::from("digraph bondgraph {\n  rankdir=LR;\n");
    for node in &view.nodes {
        let _ = writeln!(
            out,
            "  n{} [label=\"{}\", shape={}];",
            node.id.index(),
            node.label,
            shape(node.category)
        );
    }
    for bond in &view.bonds {
        let (head, tail) = match bond.causal_stroke {
            Some(n) if n == bond.to => ("teelnormal", "none"),
            Some(_) => ("lnormal", "tee"),
            None => ("lnormal", "none"),
        };
        let _ = writeln!(
            out,
            "  n{} -> n{} [label=\"{}\", dir=both, arrowhead={}, arrowtail={}];",
            bond.from.index(),
            bond.to.index(),
            bond.number,
            head,
            tail
        );
    }
    out.push_str("}\n");
    out
}
