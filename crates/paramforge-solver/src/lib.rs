//! ParamForge Solver
//!
//! This crate decides which synced variables to multiplex:
//! - Greedy slot growth for one candidate set ([`optimize`])
//! - The fixed sequence of eligibility filters ([`EligibilityFilter`])
//! - Filter scanning and candidate selection ([`Solver`])
//! - Non-fatal diagnostics about the variable table ([`diagnose`])

pub mod cost;
pub mod diagnostics;
pub mod filter;
pub mod solver;

pub use cost::optimize;
pub use diagnostics::diagnose;
pub use filter::EligibilityFilter;
pub use solver::{SolveResult, Solver};
