//! Error types for graph construction.

use paramforge_core::{ParamForgeError, ValueType};
use thiserror::Error;

/// Errors raised while assembling a [`ProtocolGraph`](crate::ProtocolGraph).
///
/// Every variant is a programming error: generated names are prefixed
/// deterministically, so callers surface these as internal failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Parameter name already in use: {0}")]
    DuplicateParameter(String),

    #[error("State '{state}' already exists in layer '{layer}'")]
    DuplicateState { layer: String, state: String },

    #[error("Layer name already in use: {0}")]
    DuplicateLayer(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Parameter '{name}' is {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: ValueType,
        found: ValueType,
    },

    /// The legacy pointer cannot address this many batches.
    #[error("{batches} batches exceed the addressable maximum of {max}")]
    IndexExhausted { batches: usize, max: usize },
}

impl From<GraphError> for ParamForgeError {
    fn from(err: GraphError) -> Self {
        ParamForgeError::Internal(err.to_string())
    }
}
