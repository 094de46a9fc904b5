//! ParamForge - Synced parameter compression for avatar state machines
//!
//! When an avatar declares more network-synced bits than the platform
//! allows, ParamForge picks variables to multiplex over a few shared slots
//! and generates the time-division protocol that carries them.
//!
//! # Example
//!
//! ```rust
//! use paramforge::prelude::*;
//!
//! let mut table = VariableTable::new();
//! let mut usage = UsageMap::new();
//! for i in 0..300 {
//!     let name = format!("Toggle{i}");
//!     table.push(SyncedVariable::bool(name.clone())).unwrap();
//!     usage.insert(name, VariableUsage::new().with_control(ControlKind::Toggle));
//! }
//!
//! let outcome = ParameterCompressor::new(CompressorConfig::default())
//!     .compress(&mut table, &usage)
//!     .unwrap();
//!
//! assert!(outcome.report.is_feasible());
//! assert!(table.total_cost() <= 256);
//! println!("{}", outcome.report);
//! ```

pub mod alignment;
pub mod compressor;
pub mod policy;
pub mod report;

pub use alignment::{AlignedParameter, AlignmentRecord, TOOL_VERSION};
pub use compressor::{CompressionOutcome, ParameterCompressor};
pub use policy::{ConfirmPrompt, FixedAnswer};
pub use report::CompressionReport;

// Data model and errors
pub use paramforge_core::{
    ControlKind, CostScore, Decision, Diagnostics, Method, ParamForgeError, SyncedVariable,
    UsageClass, UsageMap, ValueType, VariableTable, VariableUsage,
};

// Configuration
pub use paramforge_config::{CompressorConfig, ConfigError, FailurePolicy, MethodPreference};

// Solver and protocol compilers, for callers that drive the stages themselves
pub use paramforge_protocol::{
    compile, CompiledProtocol, GraphRuntime, PeerPair, ProtocolContext, ProtocolGraph,
    SyncLatency,
};
pub use paramforge_solver::{SolveResult, Solver};

/// Colored console output for compressor events.
#[cfg(feature = "console")]
pub use paramforge_console as console;

/// Everything needed for the common compress-a-table flow.
pub mod prelude {
    pub use crate::{
        AlignmentRecord, CompressionReport, CompressorConfig, ConfirmPrompt, ControlKind,
        FailurePolicy, MethodPreference, ParamForgeError, ParameterCompressor, SyncedVariable,
        UsageMap, ValueType, VariableTable, VariableUsage,
    };
}
