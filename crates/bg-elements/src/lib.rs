//! bg-elements: element library for bond-graph models.
//!
//! Provides the constitutive laws for:
//! - Effort and flow sources
//! - Linear resistors and the smooth relief valve
//! - Capacitive and inertial storage
//! - Transformers and gyrators
//!
//! One-port elements implement `OnePortElement`, two-port elements implement
//! `TwoPortElement`. Each declares its causality policy and produces explicit
//! equations once the causality of its bond(s) is known.
//!
//! # Example
//!
//! ```
//! use bg_elements::{Causality, OnePortElement, Port, Resistor};
//! use bg_symbolic::Symbol;
//!
//! let r = Resistor::new("load", 4.0).unwrap();
//! assert_eq!(r.causality_policy(), Causality::Undetermined);
//!
//! let port = Port::new(Symbol::new("e_1"), Symbol::new("f_1"), Some(true));
//! let eqs = r.equations(&port).unwrap();
//! assert_eq!(eqs[0].to_string(), "f_1 = e_1 / R_load");
//! ```

pub mod common;
pub mod error;
pub mod relief_valve;
pub mod resistor;
pub mod source;
pub mod storage;
pub mod traits;
pub mod two_port;

// Re-exports
pub use error::{ElementError, ElementResult};
pub use relief_valve::ReliefValve;
pub use resistor::Resistor;
pub use source::{EffortSource, FlowSource};
pub use storage::{Capacitor, Inertia};
pub use traits::{Causality, ElementKind, OnePortElement, Parameter, Port, TwoPortElement, TwoPortRule};
pub use two_port::{Gyrator, Transformer};
