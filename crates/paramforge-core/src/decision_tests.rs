//! Tests for the cost model.

use super::*;
use crate::domain::SyncedVariable;

fn bools(n: usize) -> Vec<SyncedVariable> {
    (0..n).map(|i| SyncedVariable::bool(format!("b{i}"))).collect()
}

fn floats(n: usize) -> Vec<SyncedVariable> {
    (0..n).map(|i| SyncedVariable::float(format!("f{i}"))).collect()
}

#[test]
fn test_index_bits_smallest_power() {
    let cases = [
        (0, 0),
        (1, 1),
        (2, 2),
        (3, 2),
        (7, 3),
        (8, 4),
        (15, 4),
        (16, 5),
    ];
    for (batch_count, bits) in cases {
        assert_eq!(index_bits_for(batch_count), bits, "batch_count {batch_count}");
        assert!(1usize << bits >= batch_count + 1);
        if bits > 0 {
            assert!(1usize << (bits - 1) < batch_count + 1);
        }
    }
}

#[test]
fn test_empty_decision_costs_nothing() {
    let decision = Decision::empty();
    assert_eq!(decision.batch_count(), 0);
    assert_eq!(decision.index_bit_count(), 0);
    assert_eq!(decision.final_cost(300), 300);
}

#[test]
fn test_batches_in_source_order() {
    let mut compressed = bools(5);
    compressed.insert(2, SyncedVariable::int("i0"));
    let decision = Decision::new(compressed, Method::Modern).with_slots(1, 2);
    let layout = decision.batches();

    assert_eq!(layout.bool.len(), 3);
    assert_eq!(layout.number.len(), 1);
    assert_eq!(layout.batch_count(), 3);
    let first: Vec<_> = layout.members(0).map(|v| v.name.as_str()).collect();
    assert_eq!(first, ["i0", "b0", "b1"]);
    let last: Vec<_> = layout.members(2).map(|v| v.name.as_str()).collect();
    assert_eq!(last, ["b4"]);
}

#[test]
fn test_zero_slots_means_zero_batches() {
    let decision = Decision::new(floats(3), Method::Modern).with_slots(0, 4);
    assert!(decision.batches().number.is_empty());
    assert_eq!(decision.batch_count(), 0);
}

#[test]
fn test_final_cost_formula() {
    let mut compressed = floats(4);
    compressed.extend(bools(4));
    let decision = Decision::new(compressed, Method::Modern).with_slots(2, 2);

    // 2 batches -> 2 index bits
    assert_eq!(decision.index_bit_count(), 2);
    // 100 + 2 + 16 + 2 - (32 + 4)
    assert_eq!(decision.final_cost(100), 84);
}

#[test]
fn test_legacy_index_fixed_byte() {
    let decision = Decision::new(bools(2), Method::Legacy).with_slots(0, 1);
    assert_eq!(decision.batch_count(), 2);
    assert_eq!(decision.index_bit_count(), LEGACY_INDEX_BITS);
    assert!(decision.uses_legacy_method());
}

#[test]
fn test_score_reflects_budget() {
    let decision = Decision::new(bools(40), Method::Modern).with_slots(0, 20);
    // 40 - 40 + 20 + 2
    assert_eq!(decision.final_cost(40), 22);
    assert!(decision.score(40, 32).is_feasible());
    assert!(!decision.score(40, 16).is_feasible());
}

#[test]
fn test_slots_match_compressed() {
    let mut compressed = floats(3);
    compressed.extend(bools(4));
    let decision = |n, b| Decision::new(compressed.clone(), Method::Modern).with_slots(n, b);

    assert!(decision(1, 2).slots_match_compressed());
    assert!(decision(3, 4).slots_match_compressed());
    // floats would ride in no batch
    assert!(!decision(0, 2).slots_match_compressed());
    assert!(!decision(1, 0).slots_match_compressed());
    // more slots than variables
    assert!(!decision(4, 2).slots_match_compressed());
    assert!(!decision(1, 5).slots_match_compressed());

    assert!(Decision::empty().slots_match_compressed());
    assert!(!Decision::empty().with_slots(0, 1).slots_match_compressed());
}
