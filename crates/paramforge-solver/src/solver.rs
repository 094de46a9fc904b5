//! Filter-scanning compression solver.
//!
//! Logging levels:
//! - **INFO**: Solve start/end with costs and chosen layout
//! - **DEBUG**: One event per evaluated eligibility filter
//! - **TRACE**: Slot growth inside [`optimize`](crate::optimize)

use paramforge_config::CompressorConfig;
use paramforge_core::{
    CostScore, Decision, Diagnostics, Method, SyncedVariable, UsageMap, VariableTable,
    BATCH_TIME_SECS, LEGACY_MAX_BATCHES,
};
use tracing::{debug, info, warn};

use crate::cost::optimize;
use crate::diagnostics::diagnose;
use crate::filter::EligibilityFilter;

/// Outcome of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    /// Best decision found; empty when no compression is needed.
    pub decision: Decision,
    /// Synced cost of the table before compression.
    pub original_cost: u32,
    /// Synced cost once `decision` is applied.
    pub final_cost: u32,
    /// Budget the solve ran against.
    pub max_cost: u32,
    /// Score of `decision`.
    pub score: CostScore,
    /// Filter that produced `decision`, if any.
    pub filter: Option<EligibilityFilter>,
    /// Non-fatal findings about the table.
    pub diagnostics: Diagnostics,
    /// Number of filters evaluated.
    pub candidates_evaluated: usize,
}

impl SolveResult {
    pub fn is_feasible(&self) -> bool {
        self.final_cost <= self.max_cost
    }

    /// True when the table already fits and nothing is compressed.
    pub fn is_untouched(&self) -> bool {
        self.decision.is_empty()
    }
}

/// Picks which variables to multiplex and how many slots to use.
///
/// # Examples
///
/// ```
/// use paramforge_core::{ControlKind, SyncedVariable, UsageMap, VariableTable, VariableUsage};
/// use paramforge_solver::Solver;
///
/// let mut table = VariableTable::new();
/// let mut usage = UsageMap::new();
/// for i in 0..40 {
///     let name = format!("toggle{i}");
///     table.push(SyncedVariable::bool(name.clone())).unwrap();
///     usage.insert(name, VariableUsage::new().with_control(ControlKind::Toggle));
/// }
///
/// let result = Solver::new(32).solve(&table, &usage);
/// assert!(result.is_feasible());
/// assert_eq!(result.decision.compressed.len(), 40);
/// ```
#[derive(Debug, Clone)]
pub struct Solver {
    max_cost: u32,
    method: Method,
    batch_time_secs: f32,
    acceptable_latency_secs: f32,
    filters: Vec<EligibilityFilter>,
}

impl Solver {
    /// Creates a solver for the modern method with default timing.
    pub fn new(max_cost: u32) -> Self {
        Self {
            max_cost,
            method: Method::Modern,
            batch_time_secs: BATCH_TIME_SECS,
            acceptable_latency_secs: 1.0,
            filters: EligibilityFilter::standard_sequence(),
        }
    }

    pub fn from_config(config: &CompressorConfig) -> Self {
        Self::new(config.max_cost)
            .with_method(config.method.into())
            .with_batch_time(config.timing.batch_time_secs)
            .with_acceptable_latency(config.solver.acceptable_latency_secs)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_batch_time(mut self, seconds: f32) -> Self {
        self.batch_time_secs = seconds;
        self
    }

    pub fn with_acceptable_latency(mut self, seconds: f32) -> Self {
        self.acceptable_latency_secs = seconds;
        self
    }

    pub fn max_cost(&self) -> u32 {
        self.max_cost
    }

    /// Projected sync latency of a decision.
    pub fn latency_secs(&self, decision: &Decision) -> f32 {
        decision.batch_count() as f32 * self.batch_time_secs
    }

    /// Solves for the given table and usage metadata.
    ///
    /// Deterministic: the same inputs always produce the same decision.
    pub fn solve(&self, table: &VariableTable, usage: &UsageMap) -> SolveResult {
        let original_cost = table.total_cost();

        info!(
            event = "compress_start",
            variable_count = table.len(),
            total_cost = original_cost,
            max_cost = self.max_cost,
        );

        if original_cost <= self.max_cost {
            info!(event = "compress_end", cost = original_cost, batches = 0u64, feasible = true);
            return SolveResult {
                decision: Decision::empty(),
                original_cost,
                final_cost: original_cost,
                max_cost: self.max_cost,
                score: CostScore::evaluate(original_cost, self.max_cost, 0),
                filter: None,
                diagnostics: Diagnostics::default(),
                candidates_evaluated: 0,
            };
        }

        let mut best: Option<(Decision, EligibilityFilter)> = None;
        let mut evaluated = 0;

        for filter in &self.filters {
            let eligible = filter.select(table, usage);
            if eligible.is_empty() {
                debug!(event = "candidate", filter = %filter, eligible = 0u64);
                continue;
            }
            evaluated += 1;

            let candidate = self.optimize_for_method(eligible, original_cost);
            let score = candidate.score(original_cost, self.max_cost);
            debug!(
                event = "candidate",
                filter = %filter,
                eligible = candidate.compressed.len(),
                batches = candidate.batch_count(),
                cost = candidate.final_cost(original_cost),
                feasible = score.is_feasible(),
                score = %score,
            );

            let replace = match &best {
                None => true,
                Some((current, _)) => self.prefers(&candidate, current, original_cost),
            };
            if replace {
                best = Some((candidate, filter.clone()));
            }

            if let Some((current, _)) = &best {
                let feasible = current.final_cost(original_cost) <= self.max_cost;
                if feasible && self.latency_secs(current) <= self.acceptable_latency_secs {
                    break;
                }
            }
        }

        let (decision, filter) = match best {
            Some((decision, filter)) => (decision, Some(filter)),
            None => (Decision::empty(), None),
        };
        let final_cost = decision.final_cost(original_cost);
        let score = decision.score(original_cost, self.max_cost);

        info!(
            event = "compress_end",
            cost = final_cost,
            batches = decision.batch_count(),
            method = %decision.method,
            feasible = score.is_feasible(),
            score = %score,
        );

        SolveResult {
            decision,
            original_cost,
            final_cost,
            max_cost: self.max_cost,
            score,
            filter,
            diagnostics: diagnose(table, usage),
            candidates_evaluated: evaluated,
        }
    }

    // Legacy indices are one byte; above 255 batches only modern can address them.
    fn optimize_for_method(&self, eligible: Vec<SyncedVariable>, original_cost: u32) -> Decision {
        if self.method == Method::Legacy {
            let decision = optimize(eligible.clone(), Method::Legacy, original_cost, self.max_cost);
            if decision.batch_count() <= LEGACY_MAX_BATCHES {
                return decision;
            }
            warn!(
                batches = decision.batch_count(),
                "Legacy method cannot address more than {} batches, using modern method",
                LEGACY_MAX_BATCHES
            );
        }
        optimize(eligible, Method::Modern, original_cost, self.max_cost)
    }

    /// Whether `candidate` (from a broader filter) should replace `current`.
    ///
    /// Cost here is the number of bits over budget, so two feasible
    /// decisions never differ in cost and are compared on latency alone.
    fn prefers(&self, candidate: &Decision, current: &Decision, original_cost: u32) -> bool {
        let candidate_score = candidate.score(original_cost, self.max_cost);
        let current_score = current.score(original_cost, self.max_cost);

        match (candidate_score.is_feasible(), current_score.is_feasible()) {
            (true, false) => true,
            (false, true) => false,
            (false, false) => candidate_score.hard() > current_score.hard(),
            (true, true) => {
                self.latency_secs(candidate) <= self.latency_secs(current) / 2.0
            }
        }
    }
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod tests;
