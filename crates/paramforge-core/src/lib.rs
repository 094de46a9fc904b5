//! ParamForge Core - Core types for synced-parameter compression
//!
//! This crate provides the fundamental data model for ParamForge:
//! - Synced variables and the variable table they belong to
//! - Usage metadata describing which controls expose each variable
//! - The compression [`Decision`] and its cost model
//! - Score and diagnostic types shared by the solver and the orchestrator

pub mod decision;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod score;

pub use decision::{
    index_bits_for, BatchLayout, Decision, Method, BATCH_TIME_SECS, LEGACY_INDEX_BITS,
    LEGACY_MAX_BATCHES,
};
pub use diagnostics::Diagnostics;
pub use domain::{
    ControlKind, SyncedVariable, UsageClass, UsageMap, ValueType, VariableTable, VariableUsage,
};
pub use error::ParamForgeError;
pub use score::CostScore;
