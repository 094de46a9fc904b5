//! Priority/shortcut multiplexing over a one-byte pointer.
//!
//! The sender puts batch `i` on the wire by writing `i` to the pointer and
//! remembers what it sent in a local `LastSynced` copy of each variable.
//! After each dwell it jumps to the first batch, in round-robin order,
//! holding a variable that no longer matches its `LastSynced` copy; when
//! nothing changed it simply moves on to the next batch.
//!
//! Receivers copy the slots straight into the real variables. Because
//! batches may arrive out of order, variables in different batches can be
//! observed transiently inconsistent with each other.

use paramforge_core::{Decision, ValueType, LEGACY_MAX_BATCHES};

use crate::context::ProtocolContext;
use crate::error::GraphError;
use crate::graph::{
    Condition, Driver, GraphBuilder, GraphParameter, Layer, ParameterId, ProtocolGraph, IS_LOCAL,
};
use crate::slots::SlotBank;

/// Compiles `decision` into a legacy protocol graph.
///
/// # Errors
///
/// Returns [`GraphError::IndexExhausted`] when the decision needs more than
/// [`LEGACY_MAX_BATCHES`] batches.
pub fn compile_legacy(
    decision: &Decision,
    ctx: &ProtocolContext,
) -> Result<ProtocolGraph, GraphError> {
    let layout = decision.batches();
    let batch_count = layout.batch_count();
    if batch_count > LEGACY_MAX_BATCHES {
        return Err(GraphError::IndexExhausted {
            batches: batch_count,
            max: LEGACY_MAX_BATCHES,
        });
    }
    let mut builder = GraphBuilder::new();
    if batch_count == 0 {
        return Ok(builder.build());
    }
    let names = &ctx.names;

    let is_local = builder.import(IS_LOCAL, ValueType::Bool, 0.0)?;
    let pointer =
        builder.add_parameter(GraphParameter::new(names.pointer(), ValueType::Int).synced())?;
    let slots = SlotBank::declare(&mut builder, names, decision)?;

    let mut last_synced = Vec::with_capacity(decision.compressed.len());
    for variable in &decision.compressed {
        let last = builder.add_parameter(
            GraphParameter::new(names.last_synced(&variable.name), variable.value_type)
                .with_default(variable.default_value),
        )?;
        last_synced.push((slots.variable(variable), last));
    }
    let last_of = |variable: ParameterId| {
        last_synced
            .iter()
            .find(|(v, _)| *v == variable)
            .map(|&(_, last)| last)
    };

    let mut layer = Layer::new(names.layer());
    let entry = layer.add_state("Entry")?;
    let start = layer.add_state("Local/Start")?;
    let idle = layer.add_state("Remote/Idle")?;
    let mut sends = Vec::with_capacity(batch_count);
    let mut nexts = Vec::with_capacity(batch_count);
    let mut receives = Vec::with_capacity(batch_count);
    for batch in 1..=batch_count {
        sends.push(layer.add_state(format!("Local/Send {batch}"))?);
        nexts.push(layer.add_state(format!("Local/Next {batch}"))?);
        receives.push(layer.add_state(format!("Remote/Receive {batch}"))?);
    }
    let points_at = |value: usize| Condition::Equals(pointer, value as i32);

    layer.add_transition(entry, start).when(Condition::IsTrue(is_local));
    layer.add_transition(entry, idle).when(Condition::IsFalse(is_local));

    // Local branch
    layer.add_driver(
        start,
        Driver::Set {
            destination: pointer,
            value: 0.0,
        },
    );
    layer.add_transition(start, sends[0]);
    for batch in 0..batch_count {
        let send = sends[batch];
        layer.add_driver(
            send,
            Driver::Set {
                destination: pointer,
                value: (batch + 1) as f32,
            },
        );
        layer.add_drivers(send, slots.encode(&layout, batch, |v| slots.variable(v)));
        for variable in layout.members(batch) {
            let id = slots.variable(variable);
            if let Some(last) = last_of(id) {
                layer.add_driver(send, Driver::copy(id, last));
            }
        }
        layer
            .add_transition(send, nexts[batch])
            .after(ctx.batch_time_secs);

        // Changed batches first, searched in round-robin order after this one
        let next = nexts[batch];
        for offset in 1..=batch_count {
            let candidate = (batch + offset) % batch_count;
            for variable in layout.members(candidate) {
                let id = slots.variable(variable);
                if let Some(last) = last_of(id) {
                    layer
                        .add_transition(next, sends[candidate])
                        .when(Condition::Differs(id, last));
                }
            }
        }
        layer.add_transition(next, sends[(batch + 1) % batch_count]);
    }

    // Remote branch
    for batch in 0..batch_count {
        layer
            .add_transition(idle, receives[batch])
            .when(points_at(batch + 1));
    }
    for batch in 0..batch_count {
        let receive = receives[batch];
        layer.add_drivers(receive, slots.decode(&layout, batch, |v| slots.variable(v)));
        // Includes a self-transition: a resent batch keeps the same pointer.
        for target in 0..batch_count {
            layer
                .add_transition(receive, receives[target])
                .when(points_at(target + 1));
        }
        layer.add_transition(receive, idle).when(points_at(0));
    }

    builder.add_layer(layer)?;
    Ok(builder.build())
}

#[cfg(test)]
#[path = "legacy_tests.rs"]
mod tests;
