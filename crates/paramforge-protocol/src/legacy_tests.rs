//! Tests for the legacy protocol compiler.

use paramforge_core::{Decision, Method, SyncedVariable};

use super::*;
use crate::naming::NameScope;
use crate::runtime::PeerPair;

const LAYER: usize = 0;

fn bools(count: usize) -> Vec<SyncedVariable> {
    (0..count)
        .map(|i| SyncedVariable::bool(format!("b{i}")))
        .collect()
}

fn compile(decision: &Decision) -> ProtocolGraph {
    compile_legacy(decision, &ProtocolContext::default()).unwrap()
}

/// Ticks until the sender leaves its current state, returning the new state.
fn next_sender_state<'g>(pair: &mut PeerPair<'g>) -> &'g str {
    let current = pair.sender.state_name(LAYER);
    for _ in 0..100 {
        pair.tick();
        if pair.sender.state_name(LAYER) != current {
            break;
        }
    }
    pair.sender.state_name(LAYER).unwrap()
}

#[test]
fn test_generated_parameters() {
    let decision = Decision::new(bools(6), Method::Legacy).with_slots(0, 2);
    let graph = compile(&decision);
    let names = NameScope::default();

    let pointer = graph.parameter(graph.find_parameter(&names.pointer()).unwrap());
    assert_eq!(pointer.value_type, ValueType::Int);
    assert!(pointer.synced);

    for i in 0..6 {
        let last = graph.find_parameter(&names.last_synced(&format!("b{i}")));
        assert!(!graph.parameter(last.unwrap()).synced);
    }
    // one byte of pointer + two bool slots, whatever the batch count
    assert_eq!(graph.generated_cost(), 10);
    assert_eq!(graph.generated_cost(), decision.overhead_cost());
}

#[test]
fn test_last_synced_starts_at_variable_default() {
    let compressed = vec![SyncedVariable::float("hue").with_default(0.5)];
    let decision = Decision::new(compressed, Method::Legacy).with_slots(1, 0);
    let graph = compile(&decision);
    let names = NameScope::default();

    let last = graph.find_parameter(&names.last_synced("hue")).unwrap();
    assert_eq!(graph.parameter(last).default_value, 0.5);
}

#[test]
fn test_rejects_more_than_255_batches() {
    let decision = Decision::new(bools(256), Method::Legacy).with_slots(0, 1);

    let err = compile_legacy(&decision, &ProtocolContext::default()).unwrap_err();
    assert_eq!(
        err,
        GraphError::IndexExhausted {
            batches: 256,
            max: 255
        }
    );
}

#[test]
fn test_accepts_exactly_255_batches() {
    let decision = Decision::new(bools(255), Method::Legacy).with_slots(0, 1);
    let graph = compile(&decision);

    assert_eq!(graph.state_count(), 3 + 3 * 255);
}

#[test]
fn test_round_robin_when_nothing_changes() {
    let decision = Decision::new(bools(3), Method::Legacy).with_slots(0, 1);
    let graph = compile(&decision);
    let names = NameScope::default();
    let mut pair = PeerPair::new(&graph, 60.0).unwrap();

    let mut pointers: Vec<f32> = Vec::new();
    for _ in 0..60 {
        pair.tick();
        let pointer = pair.sender.get(&names.pointer()).unwrap();
        if pointers.last() != Some(&pointer) {
            pointers.push(pointer);
        }
    }
    assert_eq!(&pointers[..6], &[0.0, 1.0, 2.0, 3.0, 1.0, 2.0]);
}

#[test]
fn test_changed_batch_preempts_round_robin() {
    let decision = Decision::new(bools(3), Method::Legacy).with_slots(0, 1);
    let graph = compile(&decision);
    let mut pair = PeerPair::new(&graph, 60.0).unwrap();

    pair.run(2);
    assert_eq!(pair.sender.state_name(LAYER), Some("Local/Send 1"));

    // b2 lives in batch 3; batch 2 is skipped
    pair.sender.set("b2", 1.0).unwrap();
    assert_eq!(next_sender_state(&mut pair), "Local/Next 1");
    assert_eq!(next_sender_state(&mut pair), "Local/Send 3");
    assert_eq!(pair.receiver.get("b2"), Some(1.0));
    assert_eq!(pair.receiver.state_name(LAYER), Some("Remote/Receive 3"));

    // nothing pending any more: plain round robin resumes
    assert_eq!(next_sender_state(&mut pair), "Local/Next 3");
    assert_eq!(next_sender_state(&mut pair), "Local/Send 1");
}

#[test]
fn test_changed_batch_is_resent_in_place() {
    let decision = Decision::new(bools(3), Method::Legacy).with_slots(0, 1);
    let graph = compile(&decision);
    let mut pair = PeerPair::new(&graph, 60.0).unwrap();

    pair.run(2);
    pair.sender.set("b0", 1.0).unwrap();
    assert_eq!(next_sender_state(&mut pair), "Local/Next 1");
    assert_eq!(next_sender_state(&mut pair), "Local/Send 1");

    // the pointer never changed, yet the receiver picked the new value up
    assert_eq!(pair.receiver.get("b0"), Some(1.0));
}

#[test]
fn test_receiver_decodes_every_type() {
    let compressed = vec![
        SyncedVariable::float("f0"),
        SyncedVariable::float("f1"),
        SyncedVariable::int("i0"),
        SyncedVariable::int("i1"),
        SyncedVariable::bool("b0"),
        SyncedVariable::bool("b1"),
        SyncedVariable::bool("b2"),
    ];
    let decision = Decision::new(compressed, Method::Legacy).with_slots(1, 1);
    assert_eq!(decision.batch_count(), 4);
    let graph = compile(&decision);
    let mut pair = PeerPair::new(&graph, 60.0).unwrap();

    let sent = [
        ("f0", -0.25),
        ("f1", 0.9),
        ("i0", 42.0),
        ("i1", 7.0),
        ("b0", 1.0),
        ("b2", 1.0),
    ];
    for (name, value) in sent {
        pair.sender.set(name, value).unwrap();
    }
    pair.run(2 * 4 * 6 + 4);

    for (name, value) in sent {
        let received = pair.receiver.get(name).unwrap();
        assert!(
            (received - value).abs() <= 1.0 / 254.0 + 1e-6,
            "{name}: sent {value}, received {received}"
        );
    }
    assert_eq!(pair.receiver.get("b1"), Some(0.0));
}

#[test]
fn test_empty_decision_compiles_to_empty_graph() {
    let graph = compile(&Decision::new(Vec::new(), Method::Legacy));
    assert!(graph.is_empty());
}
