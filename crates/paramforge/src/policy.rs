//! Confirmation hook for the `ask` failure policy.

use crate::report::CompressionReport;

/// Decides whether an over-budget result should be applied anyway.
///
/// Only consulted under [`FailurePolicy::Ask`](paramforge_config::FailurePolicy::Ask)
/// and only when no decision fits the budget.
pub trait ConfirmPrompt {
    /// Returns `true` to apply the best decision found.
    fn confirm(&self, report: &CompressionReport) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: Fn(&CompressionReport) -> bool,
{
    fn confirm(&self, report: &CompressionReport) -> bool {
        self(report)
    }
}

/// Answers every prompt with the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl ConfirmPrompt for FixedAnswer {
    fn confirm(&self, _report: &CompressionReport) -> bool {
        self.0
    }
}
