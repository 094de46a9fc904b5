//! Tick-driven evaluator for a [`ProtocolGraph`].
//!
//! Mirrors the host substrate closely enough to check protocol behavior:
//!
//! - Each tick, every layer takes at most one transition.
//! - A state's drivers run once, in order, when it is entered.
//! - A transition is considered no earlier than the tick after its source
//!   state was entered.
//! - Exit-time transitions fire on the first tick at which one more tick
//!   would reach the exit time, i.e. up to one tick early.
//! - Stored values are normalized by type: bools to 0/1, ints rounded and
//!   clamped to `0..=255`, floats clamped to `[-1, 1]`.
//!
//! Peers share nothing but synced parameters; [`GraphRuntime::sync_from`]
//! plays the role of the network.

use paramforge_core::ValueType;

use crate::error::GraphError;
use crate::graph::{
    Condition, Driver, ParameterId, ProtocolGraph, State, StateId, Transition, IS_LOCAL,
};

const TIME_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy)]
struct Cursor {
    state: StateId,
    elapsed: f32,
}

/// One peer's copy of a running graph.
#[derive(Debug, Clone)]
pub struct GraphRuntime<'g> {
    graph: &'g ProtocolGraph,
    values: Vec<f32>,
    cursors: Vec<Option<Cursor>>,
    tick_secs: f32,
    ticks: u64,
}

impl<'g> GraphRuntime<'g> {
    /// Starts every layer in its entry state with default parameter values.
    pub fn new(graph: &'g ProtocolGraph, tick_rate: f32) -> Self {
        let values = graph
            .parameters()
            .iter()
            .map(|p| normalize(p.value_type, p.default_value))
            .collect();
        let mut runtime = Self {
            graph,
            values,
            cursors: vec![None; graph.layers().len()],
            tick_secs: 1.0 / tick_rate,
            ticks: 0,
        };
        for (layer_index, layer) in graph.layers().iter().enumerate() {
            if let Some(entry) = layer.entry() {
                runtime.enter(layer_index, entry);
            }
        }
        runtime
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seconds per tick.
    pub fn tick_secs(&self) -> f32 {
        self.tick_secs
    }

    pub fn value(&self, id: ParameterId) -> f32 {
        self.values[id.index()]
    }

    pub fn get(&self, name: &str) -> Option<f32> {
        self.graph.find_parameter(name).map(|id| self.value(id))
    }

    /// Writes a parameter as the host would, e.g. from a menu control.
    pub fn set(&mut self, name: &str, value: f32) -> Result<(), GraphError> {
        let id = self
            .graph
            .find_parameter(name)
            .ok_or_else(|| GraphError::UnknownParameter(name.to_string()))?;
        self.store(id, value);
        Ok(())
    }

    /// Current state of layer `layer_index`.
    pub fn current_state(&self, layer_index: usize) -> Option<&'g State> {
        let graph: &'g ProtocolGraph = self.graph;
        let cursor = self.cursors.get(layer_index).copied().flatten()?;
        Some(graph.layers()[layer_index].state(cursor.state))
    }

    pub fn state_name(&self, layer_index: usize) -> Option<&'g str> {
        self.current_state(layer_index).map(|s| s.name.as_str())
    }

    /// Copies every synced parameter from `sender`, as a network update would.
    pub fn sync_from(&mut self, sender: &GraphRuntime<'_>) {
        for (index, parameter) in self.graph.parameters().iter().enumerate() {
            if parameter.synced {
                self.values[index] = sender.values[index];
            }
        }
    }

    /// Advances one substrate tick.
    pub fn tick(&mut self) {
        let graph = self.graph;
        for (layer_index, layer) in graph.layers().iter().enumerate() {
            let Some(cursor) = self.cursors[layer_index].as_mut() else {
                continue;
            };
            cursor.elapsed += self.tick_secs;
            let cursor = *cursor;

            let next = layer
                .transitions_from(cursor.state)
                .find(|t| self.can_fire(t, cursor.elapsed))
                .map(|t| t.to);
            if let Some(next) = next {
                self.enter(layer_index, next);
            }
        }
        self.ticks += 1;
    }

    /// Advances `count` ticks.
    pub fn run(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    fn can_fire(&self, transition: &Transition, elapsed: f32) -> bool {
        let timed_out = transition
            .exit_time
            .map_or(true, |exit| elapsed + self.tick_secs + TIME_EPSILON >= exit);
        timed_out && transition.conditions.iter().all(|c| self.holds(c))
    }

    fn holds(&self, condition: &Condition) -> bool {
        match *condition {
            Condition::IsTrue(p) => self.value(p) != 0.0,
            Condition::IsFalse(p) => self.value(p) == 0.0,
            Condition::Equals(p, expected) => (self.value(p) - expected as f32).abs() < 0.5,
            Condition::Differs(a, b) => self.value(a) != self.value(b),
        }
    }

    fn enter(&mut self, layer_index: usize, state: StateId) {
        self.cursors[layer_index] = Some(Cursor {
            state,
            elapsed: 0.0,
        });
        let graph = self.graph;
        for driver in &graph.layers()[layer_index].state(state).drivers {
            match *driver {
                Driver::Set { destination, value } => self.store(destination, value),
                Driver::Copy {
                    source,
                    destination,
                    remap,
                } => {
                    let value = self.value(source);
                    let value = remap.map_or(value, |r| r.apply(value));
                    self.store(destination, value);
                }
            }
        }
    }

    fn store(&mut self, id: ParameterId, value: f32) {
        let value_type = self.graph.parameter(id).value_type;
        self.values[id.index()] = normalize(value_type, value);
    }
}

/// A sending and a receiving peer joined by a lossless, zero-latency link.
#[derive(Debug, Clone)]
pub struct PeerPair<'g> {
    pub sender: GraphRuntime<'g>,
    pub receiver: GraphRuntime<'g>,
}

impl<'g> PeerPair<'g> {
    /// Creates both peers; the sender is the local one.
    pub fn new(graph: &'g ProtocolGraph, tick_rate: f32) -> Result<Self, GraphError> {
        let mut sender = GraphRuntime::new(graph, tick_rate);
        sender.set(IS_LOCAL, 1.0)?;
        let receiver = GraphRuntime::new(graph, tick_rate);
        Ok(Self { sender, receiver })
    }

    /// Ticks the sender, delivers its synced values, then ticks the receiver.
    pub fn tick(&mut self) {
        self.sender.tick();
        self.receiver.sync_from(&self.sender);
        self.receiver.tick();
    }

    pub fn run(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }
}

fn normalize(value_type: ValueType, value: f32) -> f32 {
    match value_type {
        ValueType::Bool => {
            if value != 0.0 {
                1.0
            } else {
                0.0
            }
        }
        ValueType::Int => value.round().clamp(0.0, 255.0),
        ValueType::Float => value.clamp(-1.0, 1.0),
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
