//! Domain model for synced-parameter compression
//!
//! - [`SyncedVariable`]: a named, typed value replicated to every peer
//! - [`VariableTable`]: the ordered, name-unique set of variables for one avatar
//! - [`VariableUsage`] / [`UsageMap`]: which controls expose each variable

mod usage;
mod variable;


pub use usage::{ControlKind, UsageClass, UsageMap, VariableUsage};
pub use variable::{SyncedVariable, ValueType, VariableTable};
