//! Error types for element construction and equation generation.

use bg_core::error::BgError;
use bg_symbolic::SymbolicError;
use thiserror::Error;

/// Errors raised by element variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    #[error("Invalid parameter for {element}: {what}")]
    InvalidParameter { element: String, what: String },

    #[error("Causality of {element} is undetermined")]
    UndeterminedCausality { element: String },

    #[error("Causality of {element} contradicts its constraint: {what}")]
    CausalityMismatch { element: String, what: &'static str },

    #[error("Symbolic error: {0}")]
    Symbolic(#[from] SymbolicError),
}

pub type ElementResult<T> = Result<T, ElementError>;

impl From<ElementError> for BgError {
    fn from(e: ElementError) -> Self {
        match e {
            ElementError::InvalidParameter { .. } => BgError::InvalidArg {
                what: e.to_string(),
            },
            ElementError::UndeterminedCausality { .. }
            | ElementError::CausalityMismatch { .. } => BgError::Invariant {
                what: e.to_string(),
            },
            ElementError::Symbolic(inner) => inner.into(),
        }
    }
}
