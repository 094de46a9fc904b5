//! CostScore - two-level score ranking compression candidates
//!
//! The hard level is the number of synced bits over budget (negated), the
//! soft level is the batch count (negated). A candidate is feasible when it
//! fits the budget; among feasible candidates fewer batches mean lower sync
//! latency.

use std::cmp::Ordering;
use std::fmt;

/// A score with a hard budget level and a soft latency level.
///
/// When comparing scores:
/// 1. Hard scores are compared first
/// 2. Soft scores are only compared when hard scores are equal
///
/// # Examples
///
/// ```
/// use paramforge_core::CostScore;
///
/// let over = CostScore::evaluate(260, 256, 2);   // 4 bits over budget
/// let fits = CostScore::evaluate(250, 256, 12);  // fits, but 12 batches
///
/// assert!(fits > over);
/// assert!(fits.is_feasible());
///
/// let faster = CostScore::evaluate(256, 256, 6);
/// assert!(faster > fits);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CostScore {
    hard: i64,
    soft: i64,
}

impl CostScore {
    /// The zero score: within budget, nothing multiplexed.
    pub const ZERO: CostScore = CostScore { hard: 0, soft: 0 };

    #[inline]
    pub const fn of(hard: i64, soft: i64) -> Self {
        CostScore { hard, soft }
    }

    /// Scores a candidate costing `final_cost` bits split into `batch_count` batches.
    pub fn evaluate(final_cost: u32, max_cost: u32, batch_count: usize) -> Self {
        let over = i64::from(final_cost) - i64::from(max_cost);
        CostScore::of(-over.max(0), -(batch_count as i64))
    }

    #[inline]
    pub const fn hard(&self) -> i64 {
        self.hard
    }

    #[inline]
    pub const fn soft(&self) -> i64 {
        self.soft
    }

    #[inline]
    pub const fn is_feasible(&self) -> bool {
        self.hard >= 0
    }
}

impl Ord for CostScore {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.hard.cmp(&other.hard) {
            Ordering::Equal => self.soft.cmp(&other.soft),
            other => other,
        }
    }
}

impl PartialOrd for CostScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for CostScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CostScore({}, {})", self.hard, self.soft)
    }
}

impl fmt::Display for CostScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}hard/{}soft", self.hard, self.soft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_within_budget() {
        let score = CostScore::evaluate(200, 256, 4);
        assert_eq!(score.hard(), 0);
        assert_eq!(score.soft(), -4);
        assert!(score.is_feasible());
    }

    #[test]
    fn test_evaluate_over_budget() {
        let score = CostScore::evaluate(300, 256, 1);
        assert_eq!(score.hard(), -44);
        assert!(!score.is_feasible());
    }

    #[test]
    fn test_boundary_is_feasible() {
        assert!(CostScore::evaluate(256, 256, 0).is_feasible());
    }

    #[test]
    fn test_comparison() {
        let s1 = CostScore::of(-1, 0);
        let s2 = CostScore::of(0, -10);
        let s3 = CostScore::of(0, -2);

        assert!(s2 > s1);
        assert!(s3 > s2);
    }

    #[test]
    fn test_display() {
        assert_eq!(CostScore::of(-3, -5).to_string(), "-3hard/-5soft");
        assert_eq!(format!("{:?}", CostScore::ZERO), "CostScore(0, 0)");
    }
}
