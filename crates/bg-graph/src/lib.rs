//! bg-graph: bond-graph model layer.
//!
//! Provides:
//! - The `BondGraph` arena of nodes (elements and junctions) and bonds
//! - Construction-time topology validation
//! - Sequential causality assignment (seed, propagate, storage, residual)
//! - Equation assembly and reduction to explicit state equations
//! - A read-only view for diagram renderers
//!
//! # Example
//!
//! ```
//! use bg_elements::{EffortSource, Resistor};
//! use bg_graph::{BondGraph, JunctionKind};
//!
//! let mut graph = BondGraph::new();
//! let se = graph.add_one_port(EffortSource::new("supply")).unwrap();
//! let j = graph.add_junction("j", JunctionKind::One).unwrap();
//! let r = graph.add_one_port(Resistor::new("load", 5.0).unwrap()).unwrap();
//! graph.connect(se, j).unwrap();
//! graph.connect(j, r).unwrap();
//!
//! graph.assign_causalities().unwrap();
//! let system = graph.equations().unwrap();
//! assert_eq!(system.equations.len(), 1);
//! assert_eq!(system.inputs.len(), 1);
//! ```

pub mod assemble;
pub mod builder;
pub mod causality;
pub mod error;
pub mod graph;
pub mod reduce;
pub(crate) mod validate;
pub mod view;

// Re-exports for ergonomics
pub use assemble::EquationSystem;
pub use causality::{AnalysisOptions, AssignmentStep, CausalityReport};
pub use error::{ErrorClass, GraphError, GraphResult};
pub use graph::{Bond, BondGraph, JunctionKind, Node, NodeCategory, NodeKind};
pub use reduce::StateSpace;
pub use view::{BondView, GraphView, NodeView};
