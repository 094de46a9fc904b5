//! Greedy slot growth.
//!
//! Starting from one slot per non-empty type, slots are added one at a time
//! while the decision stays within budget. Numeric slots only grow while the
//! numeric fill ratio stays at or below the bool fill ratio, so neither
//! channel keeps cycling idle batches while the other still has work.

use paramforge_core::{Decision, Method, SyncedVariable};
use tracing::trace;

/// Builds the best slot layout for compressing `compressed`.
///
/// `original_cost` is the synced cost of the whole table before
/// compression. The returned decision may still exceed `max_cost` when even
/// single-slot multiplexing does not fit; callers check feasibility.
///
/// # Examples
///
/// ```
/// use paramforge_core::{Method, SyncedVariable};
/// use paramforge_solver::optimize;
///
/// let bools: Vec<_> = (0..40).map(|i| SyncedVariable::bool(format!("b{i}"))).collect();
/// let decision = optimize(bools, Method::Modern, 40, 32);
///
/// assert_eq!(decision.number_slots, 0);
/// assert_eq!(decision.batch_count(), 2);
/// assert!(decision.final_cost(40) <= 32);
/// ```
pub fn optimize(
    compressed: Vec<SyncedVariable>,
    method: Method,
    original_cost: u32,
    max_cost: u32,
) -> Decision {
    let number_count = compressed.iter().filter(|v| !v.value_type.is_bool()).count();
    let bool_count = compressed.len() - number_count;

    let mut decision = Decision::new(compressed, method)
        .with_slots(usize::from(number_count > 0), usize::from(bool_count > 0));

    loop {
        if decision.number_slots < number_count
            && !number_fill_exceeds_bool_fill(
                decision.number_slots + 1,
                number_count,
                decision.bool_slots,
                bool_count,
            )
        {
            decision.number_slots += 1;
            if decision.final_cost(original_cost) <= max_cost {
                trace!(
                    event = "grow",
                    number_slots = decision.number_slots,
                    bool_slots = decision.bool_slots,
                );
                continue;
            }
            decision.number_slots -= 1;
        }

        if decision.bool_slots < bool_count {
            decision.bool_slots += 1;
            if decision.final_cost(original_cost) <= max_cost {
                trace!(
                    event = "grow",
                    number_slots = decision.number_slots,
                    bool_slots = decision.bool_slots,
                );
                continue;
            }
            decision.bool_slots -= 1;
        }

        break;
    }

    decision
}

// number_slots / number_count > bool_slots / bool_count, without division.
fn number_fill_exceeds_bool_fill(
    number_slots: usize,
    number_count: usize,
    bool_slots: usize,
    bool_count: usize,
) -> bool {
    if bool_count == 0 {
        return false;
    }
    number_slots * bool_count > bool_slots * number_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramforge_core::index_bits_for;

    fn bools(n: usize) -> Vec<SyncedVariable> {
        (0..n).map(|i| SyncedVariable::bool(format!("b{i}"))).collect()
    }

    fn floats(n: usize) -> Vec<SyncedVariable> {
        (0..n).map(|i| SyncedVariable::float(format!("f{i}"))).collect()
    }

    #[test]
    fn test_forty_toggles_into_thirty_two_bits() {
        let decision = optimize(bools(40), Method::Modern, 40, 32);

        assert_eq!(decision.number_slots, 0);
        assert_eq!(decision.bool_slots, 30);
        assert_eq!(decision.batch_count(), 2);
        assert_eq!(decision.final_cost(40), 32);
        assert_eq!(decision.compressed.len(), 40);
    }

    #[test]
    fn test_empty_candidates() {
        let decision = optimize(Vec::new(), Method::Modern, 10, 5);
        assert_eq!(decision.number_slots, 0);
        assert_eq!(decision.bool_slots, 0);
        assert!(decision.is_empty());
    }

    #[test]
    fn test_unlimited_budget_grows_to_one_batch() {
        let mut candidates = floats(3);
        candidates.extend(bools(5));
        let decision = optimize(candidates, Method::Modern, 29, 1000);

        assert_eq!(decision.number_slots, 3);
        assert_eq!(decision.bool_slots, 5);
        assert_eq!(decision.batch_count(), 1);
    }

    #[test]
    fn test_infeasible_keeps_single_slots() {
        // 4 floats at 32 bits, but budget 1: even single slot costs 8 + index
        let decision = optimize(floats(4), Method::Modern, 32, 1);
        assert_eq!(decision.number_slots, 1);
        assert_eq!(decision.batch_count(), 4);
        assert!(decision.final_cost(32) > 1);
    }

    #[test]
    fn test_number_growth_tracks_bool_fill() {
        // 10 numbers, 40 bools, plenty of other synced state
        let mut candidates = floats(10);
        candidates.extend(bools(40));
        let original = 10 * 8 + 40 + 100;
        let decision = optimize(candidates, Method::Modern, original, 190);

        let layout = decision.batches();
        let number_batches = layout.number.len();
        let bool_batches = layout.bool.len();
        assert!(decision.final_cost(original) <= 190);
        assert!(
            number_batches.abs_diff(bool_batches) <= 1,
            "{number_batches} vs {bool_batches}"
        );
    }

    #[test]
    fn test_legacy_pays_full_index_byte() {
        let modern = optimize(bools(40), Method::Modern, 40, 32);
        let legacy = optimize(bools(40), Method::Legacy, 40, 32);

        assert_eq!(legacy.index_bit_count(), 8);
        assert!(legacy.bool_slots < modern.bool_slots);
        assert!(legacy.final_cost(40) <= 32);
    }

    #[test]
    fn test_result_within_budget_when_feasible() {
        for count in 1..60 {
            let original = count as u32;
            let budget = original / 2 + 4;
            let decision = optimize(bools(count), Method::Modern, original, budget);
            let batches = decision.batch_count();
            let minimal = decision.bool_slots + index_bits_for(batches) as usize;
            if minimal as u32 <= budget {
                assert!(decision.final_cost(original) <= budget, "count {count}");
            }
        }
    }
}
