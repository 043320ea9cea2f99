//! Error types for symbolic evaluation.

use bg_core::BgError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SymbolicError {
    #[error("No value bound for symbol {symbol}")]
    UnboundSymbol { symbol: String },

    #[error("Evaluation produced a non-finite value: {expr}")]
    NonFinite { expr: String },

    #[error("Cannot evaluate time derivative of {symbol} numerically")]
    Derivative { symbol: String },
}

pub type SymbolicResult<T> = Result<T, SymbolicError>;

impl From<SymbolicError> for BgError {
    fn from(e: SymbolicError) -> Self {
        BgError::InvalidArg {
            what: e.to_string(),
        }
    }
}
