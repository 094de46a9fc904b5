//! Tests for the compression orchestrator.

use std::cell::Cell;
use std::rc::Rc;

use paramforge_config::MethodPreference;
use paramforge_core::Method;
use paramforge_test::{random_avatar, AvatarBuilder};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::*;
use crate::policy::FixedAnswer;

fn compressor(max_cost: u32) -> ParameterCompressor {
    ParameterCompressor::new(CompressorConfig::new().with_max_cost(max_cost))
}

fn synced_names(table: &VariableTable) -> Vec<String> {
    table.synced().map(|v| v.name.clone()).collect()
}

#[test]
fn test_under_budget_leaves_table_alone() {
    let mut fixture = AvatarBuilder::new().toggles(10).radials(2).build();
    let before = fixture.table.clone();

    let outcome = compressor(256)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    assert_eq!(fixture.table, before);
    assert!(outcome.decision.is_empty());
    assert!(outcome.protocol.is_none());
    assert!(!outcome.report.is_compressed());
    assert_eq!(outcome.report.final_cost, 26);
}

#[test]
fn test_exact_budget_is_not_over() {
    let mut fixture = AvatarBuilder::new().toggles(32).build();

    let outcome = compressor(32)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    assert!(outcome.decision.is_empty());
    assert_eq!(fixture.table.total_cost(), 32);
}

#[test]
fn test_forty_toggles_fit_thirty_two_bits() {
    let mut fixture = AvatarBuilder::new().toggles(40).build();

    let outcome = compressor(32)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    let report = &outcome.report;
    assert!(report.is_feasible());
    assert_eq!(report.method, Some(Method::Modern));
    assert_eq!(report.number_slots, 0);
    assert!(report.bool_slots > 0);
    assert_eq!(fixture.table.total_cost(), report.final_cost);

    for variable in &outcome.decision.compressed {
        let entry = fixture.table.get(&variable.name).unwrap();
        assert!(!entry.is_network_synced);
    }
    assert!(fixture.table.contains("PF/Compress/Index/Bit0"));
    assert!(fixture.table.contains("PF/Compress/Slot/Bool0"));
}

#[test]
fn test_generated_parameters_match_graph() {
    let mut fixture = AvatarBuilder::new().toggles(40).radials(6).build();

    let outcome = compressor(40)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();
    let protocol = outcome.protocol.as_ref().unwrap();

    for parameter in protocol.graph.generated_parameters() {
        let variable = fixture.table.get(&parameter.name).unwrap();
        assert_eq!(variable.value_type, parameter.value_type);
        assert_eq!(variable.is_network_synced, parameter.synced);
        assert_eq!(variable.default_value, parameter.default_value);
    }
}

#[test]
fn test_legacy_preference() {
    let mut fixture = AvatarBuilder::new().toggles(40).build();
    let config = CompressorConfig::new()
        .with_max_cost(36)
        .with_method(MethodPreference::Legacy);

    let outcome = ParameterCompressor::new(config)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    assert_eq!(outcome.report.method, Some(Method::Legacy));
    assert_eq!(outcome.report.index_bits, 8);
    assert!(fixture.table.get("PF/Compress/Pointer").unwrap().is_network_synced);
    let shadow = fixture.table.get("PF/Compress/LastSynced/Toggle0").unwrap();
    assert!(!shadow.is_network_synced);
    assert_eq!(fixture.table.total_cost(), outcome.report.final_cost);
}

#[test]
fn test_custom_prefix() {
    let mut fixture = AvatarBuilder::new().toggles(40).build();
    let config = CompressorConfig::new()
        .with_max_cost(32)
        .with_name_prefix("Avatar/Mux");

    ParameterCompressor::new(config)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    assert!(fixture.table.contains("Avatar/Mux/Index/Bit0"));
    assert!(!fixture.table.iter().any(|v| v.name.starts_with("PF/")));
}

#[test]
fn test_infeasible_fails_by_default() {
    let mut fixture = AvatarBuilder::new().toggles(40).external_bools(40).build();
    let before = fixture.table.clone();

    let err = compressor(32)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap_err();

    match err {
        ParamForgeError::Infeasible {
            current_cost,
            best_cost,
            max_cost,
            diagnostics,
        } => {
            assert_eq!(current_cost, 80);
            assert!(best_cost > 32 && best_cost < 80);
            assert_eq!(max_cost, 32);
            assert_eq!(diagnostics.external_only.len(), 40);
        }
        other => panic!("expected Infeasible, got {other:?}"),
    }
    assert_eq!(fixture.table, before);
}

#[test]
fn test_best_effort_applies_anyway() {
    let mut fixture = AvatarBuilder::new().toggles(40).external_bools(40).build();
    let config = CompressorConfig::new()
        .with_max_cost(32)
        .with_failure_policy(FailurePolicy::BestEffort);

    let outcome = ParameterCompressor::new(config)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    assert!(!outcome.report.is_feasible());
    assert!(!outcome.report.warnings.is_empty());
    assert_eq!(fixture.table.total_cost(), outcome.report.final_cost);
    assert!(fixture.table.total_cost() < 80);
}

#[test]
fn test_ask_policy_consults_prompt() {
    let config = CompressorConfig::new()
        .with_max_cost(32)
        .with_failure_policy(FailurePolicy::Ask);
    let seen = Rc::new(Cell::new(0u32));
    let seen_in_prompt = Rc::clone(&seen);

    let mut fixture = AvatarBuilder::new().toggles(40).external_bools(40).build();
    let outcome = ParameterCompressor::new(config)
        .with_prompt(move |report: &CompressionReport| {
            seen_in_prompt.set(report.final_cost);
            true
        })
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    assert_eq!(seen.get(), outcome.report.final_cost);
    assert_eq!(fixture.table.total_cost(), outcome.report.final_cost);
}

#[test]
fn test_ask_policy_declined() {
    let mut fixture = AvatarBuilder::new().toggles(40).external_bools(40).build();
    let before = fixture.table.clone();
    let config = CompressorConfig::new()
        .with_max_cost(32)
        .with_failure_policy(FailurePolicy::Ask);

    let err = ParameterCompressor::new(config)
        .with_prompt(FixedAnswer(false))
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap_err();

    assert!(matches!(err, ParamForgeError::Declined));
    assert_eq!(fixture.table, before);
}

#[test]
fn test_ask_policy_without_prompt() {
    let mut fixture = AvatarBuilder::new().toggles(40).external_bools(40).build();
    let config = CompressorConfig::new()
        .with_max_cost(32)
        .with_failure_policy(FailurePolicy::Ask);

    let err = ParameterCompressor::new(config)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap_err();

    assert!(matches!(err, ParamForgeError::Config(_)));
}

#[test]
fn test_prompt_unused_when_feasible() {
    let mut fixture = AvatarBuilder::new().toggles(40).build();
    let config = CompressorConfig::new()
        .with_max_cost(32)
        .with_failure_policy(FailurePolicy::Ask);

    let outcome = ParameterCompressor::new(config)
        .with_prompt(|_: &CompressionReport| -> bool { panic!("prompted for a feasible result") })
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap();

    assert!(outcome.report.is_feasible());
}

#[test]
fn test_invalid_config() {
    let mut fixture = AvatarBuilder::new().toggles(4).build();

    let err = compressor(0)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap_err();

    assert!(matches!(err, ParamForgeError::Config(_)));
}

#[test]
fn test_name_collision_is_internal() {
    let mut fixture = AvatarBuilder::new()
        .toggles(40)
        .bare(SyncedVariable::bool("PF/Compress/Slot/Bool0").unsynced())
        .build();
    let before = fixture.table.clone();

    let err = compressor(32)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap_err();

    assert!(matches!(err, ParamForgeError::Internal(ref m) if m.contains("Slot/Bool0")));
    assert_eq!(fixture.table, before);
}

#[test]
fn test_alignment_replays_primary_layout() {
    let primary = AvatarBuilder::new().toggles(40).radials(6).build();

    let mut primary_table = primary.table.clone();
    let first = compressor(40)
        .with_avatar_id("avtr_1")
        .compress(&mut primary_table, &primary.usage)
        .unwrap();
    let record = first.alignment.clone().unwrap();
    assert_eq!(record.parameters.len(), 46);

    // Secondary platform with different usage metadata must still match.
    let mut secondary_table = primary.table.clone();
    let second = compressor(40)
        .with_avatar_id("avtr_1")
        .with_alignment(record.clone())
        .compress(&mut secondary_table, &UsageMap::new())
        .unwrap();

    assert!(second.report.from_alignment);
    assert_eq!(second.decision, first.decision);
    assert_eq!(synced_names(&secondary_table), synced_names(&primary_table));
    assert_eq!(second.alignment, Some(record));
}

#[test]
fn test_alignment_requires_avatar_id() {
    let mut fixture = AvatarBuilder::new().toggles(40).build();
    let record = AlignmentRecord::from_decision("avtr_1", &fixture.table, &Decision::empty());

    let err = compressor(32)
        .with_alignment(record)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap_err();

    assert!(matches!(err, ParamForgeError::Config(_)));
}

#[test]
fn test_alignment_mismatch_leaves_table_alone() {
    let primary = AvatarBuilder::new().toggles(40).build();
    let mut primary_table = primary.table.clone();
    let record = compressor(32)
        .with_avatar_id("avtr_1")
        .compress(&mut primary_table, &primary.usage)
        .unwrap()
        .alignment
        .unwrap();

    let mut fixture = AvatarBuilder::new().toggles(41).build();
    let before = fixture.table.clone();
    let err = compressor(32)
        .with_avatar_id("avtr_1")
        .with_alignment(record)
        .compress(&mut fixture.table, &fixture.usage)
        .unwrap_err();

    assert!(matches!(err, ParamForgeError::AlignmentMismatch(_)));
    assert_eq!(fixture.table, before);
}

#[test]
fn test_random_avatars_cost_matches_report() {
    for seed in 0..8 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut fixture = random_avatar(&mut rng, 80);
        let config = CompressorConfig::new()
            .with_max_cost(256)
            .with_failure_policy(FailurePolicy::BestEffort);

        let outcome = ParameterCompressor::new(config)
            .compress(&mut fixture.table, &fixture.usage)
            .unwrap();

        assert_eq!(
            fixture.table.total_cost(),
            outcome.report.final_cost,
            "seed {seed}"
        );
    }
}

#[test]
fn test_solving_twice_is_deterministic() {
    let fixture = AvatarBuilder::new().toggles(30).radials(20).submenu_ints(10).build();

    let mut first = fixture.table.clone();
    let mut second = fixture.table.clone();
    let a = compressor(128).compress(&mut first, &fixture.usage).unwrap();
    let b = compressor(128).compress(&mut second, &fixture.usage).unwrap();

    assert_eq!(a.decision, b.decision);
    assert_eq!(first, second);
}

#[test]
fn test_replayed_record_without_slots_leaves_table_alone() {
    let primary = AvatarBuilder::new().toggles(40).radials(6).build();
    let mut primary_table = primary.table.clone();
    let mut record = compressor(40)
        .with_avatar_id("avtr_1")
        .compress(&mut primary_table, &primary.usage)
        .unwrap()
        .alignment
        .unwrap();
    assert!(record.parameters.iter().any(|p| p.compressed && p.name == "Radial40"));
    record.number_slots = 0;

    let mut table = primary.table.clone();
    let err = compressor(40)
        .with_avatar_id("avtr_1")
        .with_alignment(record)
        .compress(&mut table, &primary.usage)
        .unwrap_err();

    assert!(matches!(err, ParamForgeError::AlignmentMismatch(_)));
    assert_eq!(table, primary.table);
}

#[test]
fn test_unbatched_decision_is_internal() {
    let floats = vec![SyncedVariable::float("Hue"), SyncedVariable::float("Tint")];
    let decision = Decision::new(floats, Method::Modern).with_slots(0, 0);

    let err = check_batched(&decision).unwrap_err();
    assert!(matches!(err, ParamForgeError::Internal(ref m) if m.contains("2 compressed")));
    assert!(check_batched(&decision.with_slots(1, 0)).is_ok());
}
