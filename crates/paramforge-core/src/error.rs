//! Error types for ParamForge

use thiserror::Error;

use crate::diagnostics::Diagnostics;

/// Main error type for ParamForge operations
#[derive(Debug, Error)]
pub enum ParamForgeError {
    /// A variable name appears twice in the same table
    #[error("Duplicate variable: {0}")]
    DuplicateVariable(String),

    /// Even with every eligible variable compressed the budget is exceeded
    #[error(
        "Synced parameter budget exceeded: {current_cost} bits in use, \
         {best_cost} bits after maximum compression, limit is {max_cost}"
    )]
    Infeasible {
        current_cost: u32,
        best_cost: u32,
        max_cost: u32,
        diagnostics: Diagnostics,
    },

    /// The cross-platform alignment record does not describe this avatar
    #[error("Platform alignment mismatch: {0}")]
    AlignmentMismatch(String),

    /// The cross-platform alignment record came from another tool version
    #[error("Platform alignment record was written by version {found}, this build is {expected}")]
    AlignmentVersion { expected: String, found: String },

    /// The cross-platform alignment record could not be parsed or written
    #[error("Platform alignment record is malformed: {0}")]
    AlignmentFormat(String),

    /// The caller was asked to accept an over-budget result and refused
    #[error("Compression was declined")]
    Declined,

    /// Error in compressor configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading or writing a file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ParamForge operations
pub type Result<T> = std::result::Result<T, ParamForgeError>;
