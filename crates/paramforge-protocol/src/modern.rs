//! Round-robin, binary-indexed, latched multiplexing.
//!
//! One layer with two branches, chosen once by [`IS_LOCAL`]:
//!
//! ```text
//!            ┌─ IsLocal ──▶ Local/Start ─▶ Send 1 ─▶ Spacer 1 ─▶ Send 2 ─▶ … ─▶ Spacer n ─┐
//!  Entry ────┤                               ▲                                          │
//!            │                               └──────────────────────────────────────────┘
//!            └─ !IsLocal ─▶ Remote/Idle ◀──▶ Receive i ─▶ Receive i+1 ─▶ …
//! ```
//!
//! Batch `i` is announced by writing `i` to the index bits (MSB first); 0
//! means no batch is on the wire. Send 1 snapshots every intermediate
//! batch's variables into hidden latch parameters, intermediate batches
//! travel from and into those latches, and Receive n flushes them into the
//! real variables, so a batch is never a mix of two cycles.

use paramforge_core::{index_bits_for, Decision, ValueType};

use crate::context::ProtocolContext;
use crate::error::GraphError;
use crate::graph::{
    Condition, Driver, GraphBuilder, GraphParameter, Layer, ParameterId, ProtocolGraph, IS_LOCAL,
};
use crate::slots::SlotBank;

/// Compiles `decision` into a modern protocol graph.
///
/// An empty decision yields an empty graph.
pub fn compile_modern(
    decision: &Decision,
    ctx: &ProtocolContext,
) -> Result<ProtocolGraph, GraphError> {
    let layout = decision.batches();
    let batch_count = layout.batch_count();
    let mut builder = GraphBuilder::new();
    if batch_count == 0 {
        return Ok(builder.build());
    }
    let names = &ctx.names;

    let is_local = builder.import(IS_LOCAL, ValueType::Bool, 0.0)?;
    let bit_count = index_bits_for(batch_count);
    let index = (0..bit_count)
        .map(|bit| {
            builder.add_parameter(GraphParameter::new(names.index_bit(bit), ValueType::Bool).synced())
        })
        .collect::<Result<Vec<_>, _>>()?;
    let slots = SlotBank::declare(&mut builder, names, decision)?;

    let is_intermediate = |batch: usize| batch != 0 && batch != batch_count - 1;

    // (variable, latch) for every member of an intermediate batch
    let mut latches: Vec<(ParameterId, ParameterId)> = Vec::new();
    for batch in (0..batch_count).filter(|&b| is_intermediate(b)) {
        for variable in layout.members(batch) {
            let latch = builder.add_parameter(
                GraphParameter::new(names.latch(&variable.name), variable.value_type)
                    .with_default(variable.default_value),
            )?;
            latches.push((slots.variable(variable), latch));
        }
    }
    let latch_of = |variable: ParameterId| {
        latches
            .iter()
            .find(|(v, _)| *v == variable)
            .map_or(variable, |&(_, latch)| latch)
    };
    let snapshot: Vec<Driver> = latches.iter().map(|&(v, l)| Driver::copy(v, l)).collect();
    let flush: Vec<Driver> = latches.iter().map(|&(v, l)| Driver::copy(l, v)).collect();

    let mut layer = Layer::new(names.layer());
    let entry = layer.add_state("Entry")?;
    let start = layer.add_state("Local/Start")?;
    let idle = layer.add_state("Remote/Idle")?;
    let mut sends = Vec::with_capacity(batch_count);
    let mut spacers = Vec::with_capacity(batch_count);
    let mut receives = Vec::with_capacity(batch_count);
    for batch in 1..=batch_count {
        sends.push(layer.add_state(format!("Local/Send {batch}"))?);
        spacers.push(layer.add_state(format!("Local/Spacer {batch}"))?);
        receives.push(layer.add_state(format!("Remote/Receive {batch}"))?);
    }

    layer.add_transition(entry, start).when(Condition::IsTrue(is_local));
    layer.add_transition(entry, idle).when(Condition::IsFalse(is_local));

    // Local branch
    layer.add_drivers(start, index_drivers(&index, 0));
    layer.add_transition(start, sends[0]);
    for batch in 0..batch_count {
        let send = sends[batch];
        if batch == 0 {
            layer.add_drivers(send, snapshot.iter().copied());
        }
        layer.add_drivers(send, index_drivers(&index, batch + 1));
        let staged = is_intermediate(batch);
        layer.add_drivers(
            send,
            slots.encode(&layout, batch, |v| {
                let id = slots.variable(v);
                if staged {
                    latch_of(id)
                } else {
                    id
                }
            }),
        );
        layer
            .add_transition(send, spacers[batch])
            .after(ctx.batch_time_secs);
        layer.add_transition(spacers[batch], sends[(batch + 1) % batch_count]);
    }

    // Remote branch
    layer.add_drivers(idle, snapshot.iter().copied());
    for batch in 0..batch_count {
        layer
            .add_transition(idle, receives[batch])
            .when_all(index_conditions(&index, batch + 1));
    }
    let index_values = 1usize << bit_count;
    for batch in 0..batch_count {
        let receive = receives[batch];
        let staged = is_intermediate(batch);
        layer.add_drivers(
            receive,
            slots.decode(&layout, batch, |v| {
                let id = slots.variable(v);
                if staged {
                    latch_of(id)
                } else {
                    id
                }
            }),
        );
        if batch == batch_count - 1 {
            layer.add_drivers(receive, flush.iter().copied());
        }

        // With a single batch the index never changes, so the receiver
        // re-enters to pick up new slot contents.
        let next = (batch + 1) % batch_count;
        layer
            .add_transition(receive, receives[next])
            .when_all(index_conditions(&index, next + 1));
        for value in (0..index_values).filter(|&v| v != batch + 1 && v != next + 1) {
            layer
                .add_transition(receive, idle)
                .when_all(index_conditions(&index, value));
        }
    }

    builder.add_layer(layer)?;
    Ok(builder.build())
}

/// Sets the index bits to `value`, most significant bit first.
fn index_drivers(index: &[ParameterId], value: usize) -> Vec<Driver> {
    let width = index.len();
    index
        .iter()
        .enumerate()
        .map(|(bit, &destination)| Driver::Set {
            destination,
            value: ((value >> (width - 1 - bit)) & 1) as f32,
        })
        .collect()
}

/// Conditions that hold exactly when the index bits read `value`.
fn index_conditions(index: &[ParameterId], value: usize) -> Vec<Condition> {
    let width = index.len();
    index
        .iter()
        .enumerate()
        .map(|(bit, &p)| {
            if (value >> (width - 1 - bit)) & 1 == 1 {
                Condition::IsTrue(p)
            } else {
                Condition::IsFalse(p)
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "modern_tests.rs"]
mod tests;
