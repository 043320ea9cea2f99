//! Graph-specific error types.

use bg_core::{BgError, BondId, NodeId};
use bg_elements::ElementError;
use bg_symbolic::SymbolicError;
use thiserror::Error;

/// Broad class of a `GraphError`, for callers that only need to know who
/// has to fix what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed construction; raised by the construction call itself.
    Topology,
    /// Contradictory causality requirements; the model must be changed.
    CausalityConflict,
    /// An operation was called in the wrong analysis phase.
    Precondition,
}

/// Construction, causality and assembly errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node {node} does not belong to this graph")]
    UnknownNode { node: NodeId },

    #[error("No node named '{name}'")]
    UnknownName { name: String },

    #[error("A node named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Node names must not be empty")]
    EmptyName,

    #[error("Cannot bond node '{node}' to itself")]
    SelfBond { node: String },

    #[error("Node '{node}' cannot take another bond: {what}")]
    PortAlreadyBonded { node: String, what: &'static str },

    #[error("Node '{node}' is not fully bonded: {what}")]
    UnbondedNode { node: String, what: &'static str },

    #[error("Topology is frozen once causality analysis has started")]
    AnalysisStarted,

    #[error("Element error: {0}")]
    Element(#[from] ElementError),

    #[error("Evaluation failed: {0}")]
    Symbolic(#[from] SymbolicError),

    #[error("Causality conflict at '{node}' on bond {bond}: {reason}")]
    CausalityConflict {
        node: String,
        bond: u32,
        reason: &'static str,
    },

    #[error("Storage elements left in derivative causality: {}", .nodes.join(", "))]
    DerivativeCausality { nodes: Vec<String> },

    #[error("Algebraic loop detected: {what}")]
    AlgebraicLoop { what: String },

    #[error("Causality of bond {bond} is not assigned")]
    UndeterminedCausality { bond: u32 },

    #[error("Causalities are already assigned; reset them before re-running")]
    CausalityAlreadyAssigned,

    #[error("Duplicate state symbol encountered: {symbol}")]
    DuplicateStateSymbol { symbol: String },

    #[error("Variable {symbol} is defined by more than one equation")]
    DuplicateDefinition { symbol: String },
}

pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    pub(crate) fn conflict(node: &str, bond: BondId, reason: &'static str) -> Self {
        GraphError::CausalityConflict {
            node: node.to_string(),
            bond: bond.index() + 1,
            reason,
        }
    }

    pub(crate) fn undetermined(bond: BondId) -> Self {
        GraphError::UndeterminedCausality {
            bond: bond.index() + 1,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            GraphError::UnknownNode { .. }
            | GraphError::UnknownName { .. }
            | GraphError::DuplicateName { .. }
            | GraphError::EmptyName
            | GraphError::SelfBond { .. }
            | GraphError::PortAlreadyBonded { .. }
            | GraphError::UnbondedNode { .. }
            | GraphError::AnalysisStarted => ErrorClass::Topology,
            GraphError::Element(ElementError::InvalidParameter { .. }) => ErrorClass::Topology,
            GraphError::Element(_) => ErrorClass::Precondition,
            GraphError::CausalityConflict { .. }
            | GraphError::DerivativeCausality { .. }
            | GraphError::AlgebraicLoop { .. } => ErrorClass::CausalityConflict,
            GraphError::UndeterminedCausality { .. }
            | GraphError::Symbolic(_)
            | GraphError::CausalityAlreadyAssigned
            | GraphError::DuplicateStateSymbol { .. }
            | GraphError::DuplicateDefinition { .. } => ErrorClass::Precondition,
        }
    }
}

impl From<GraphError> for BgError {
    fn from(err: GraphError) -> Self {
        match err.class() {
            ErrorClass::Topology => BgError::InvalidArg {
                what: err.to_string(),
            },
            ErrorClass::CausalityConflict | ErrorClass::Precondition => BgError::Invariant {
                what: err.to_string(),
            },
        }
    }
}
