//! bg-core: stable foundation for the bond-graph engine.
//!
//! Contains:
//! - ids (compact arena handles for nodes and bonds)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{BgError, BgResult};
pub use ids::*;
pub use numeric::*;
