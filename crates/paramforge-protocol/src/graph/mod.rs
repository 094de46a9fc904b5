//! Explicit state-machine graph.
//!
//! A [`ProtocolGraph`] is a flat parameter table plus layers of states and
//! transitions. Identifiers are indices into the owning arena, so a graph
//! can be inspected, compared and simulated without any host objects.
//!
//! ```text
//! ProtocolGraph
//! ├── parameters: [GraphParameter]      <- ParameterId
//! └── layers: [Layer]
//!     ├── states: [State { drivers }]   <- StateId
//!     └── transitions: [Transition { from, to, conditions, exit_time }]
//! ```

mod builder;

use std::fmt;

use paramforge_core::ValueType;
use smallvec::SmallVec;

pub use builder::GraphBuilder;

use crate::error::GraphError;

/// Name of the host-provided parameter that is true only on the owning peer.
pub const IS_LOCAL: &str = "IsLocal";

/// Index of a parameter within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterId(pub(crate) usize);

impl ParameterId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a state within its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a parameter comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterOrigin {
    /// Created by a protocol compiler.
    Generated,
    /// Owned by the variable table or the host; only referenced.
    Imported,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphParameter {
    pub name: String,
    pub value_type: ValueType,
    /// Whether the platform replicates this parameter to other peers.
    pub synced: bool,
    pub default_value: f32,
    pub origin: ParameterOrigin,
}

impl GraphParameter {
    /// A generated, local-only parameter with a zero default.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            synced: false,
            default_value: 0.0,
            origin: ParameterOrigin::Generated,
        }
    }

    pub fn synced(mut self) -> Self {
        self.synced = true;
        self
    }

    pub fn with_default(mut self, value: f32) -> Self {
        self.default_value = value;
        self
    }

    pub fn is_generated(&self) -> bool {
        self.origin == ParameterOrigin::Generated
    }

    /// Synced bits this parameter costs.
    pub fn bit_cost(&self) -> u32 {
        if self.synced {
            self.value_type.bit_cost()
        } else {
            0
        }
    }
}

/// Linear mapping applied by a copy driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Remap {
    pub source: (f32, f32),
    pub destination: (f32, f32),
}

impl Remap {
    /// Float domain `[-1, 1]` onto the byte slot range `[0, 254]`.
    ///
    /// 255 stays unused so that `1.0` never rounds onto a boundary value.
    pub const ENCODE_FLOAT: Remap = Remap {
        source: (-1.0, 1.0),
        destination: (0.0, 254.0),
    };

    /// Inverse of [`Remap::ENCODE_FLOAT`].
    pub const DECODE_FLOAT: Remap = Remap {
        source: (0.0, 254.0),
        destination: (-1.0, 1.0),
    };

    pub fn apply(self, value: f32) -> f32 {
        let (s0, s1) = self.source;
        let (d0, d1) = self.destination;
        d0 + (value - s0) * (d1 - d0) / (s1 - s0)
    }
}

/// A transition guard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    IsTrue(ParameterId),
    IsFalse(ParameterId),
    Equals(ParameterId, i32),
    /// The two parameters currently hold different values.
    Differs(ParameterId, ParameterId),
}

impl Condition {
    fn parameters(&self) -> SmallVec<[ParameterId; 2]> {
        match *self {
            Condition::IsTrue(p) | Condition::IsFalse(p) | Condition::Equals(p, _) => {
                SmallVec::from_slice(&[p])
            }
            Condition::Differs(a, b) => SmallVec::from_slice(&[a, b]),
        }
    }
}

/// A side effect applied when a state is entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Driver {
    Set {
        destination: ParameterId,
        value: f32,
    },
    Copy {
        source: ParameterId,
        destination: ParameterId,
        remap: Option<Remap>,
    },
}

impl Driver {
    pub fn copy(source: ParameterId, destination: ParameterId) -> Self {
        Driver::Copy {
            source,
            destination,
            remap: None,
        }
    }

    pub fn destination(&self) -> ParameterId {
        match *self {
            Driver::Set { destination, .. } | Driver::Copy { destination, .. } => destination,
        }
    }

    fn parameters(&self) -> SmallVec<[ParameterId; 2]> {
        match *self {
            Driver::Set { destination, .. } => SmallVec::from_slice(&[destination]),
            Driver::Copy {
                source,
                destination,
                ..
            } => SmallVec::from_slice(&[source, destination]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub name: String,
    pub drivers: Vec<Driver>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    /// All must hold.
    pub conditions: SmallVec<[Condition; 4]>,
    /// Minimum time in the source state, in seconds.
    pub exit_time: Option<f32>,
}

impl Transition {
    pub fn when(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn when_all(&mut self, conditions: impl IntoIterator<Item = Condition>) -> &mut Self {
        self.conditions.extend(conditions);
        self
    }

    pub fn after(&mut self, seconds: f32) -> &mut Self {
        self.exit_time = Some(seconds);
        self
    }
}

/// One state machine. The first state added is the entry state.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    name: String,
    states: Vec<State>,
    transitions: Vec<Transition>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a state with no drivers.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateState`] if the name is taken in this layer.
    pub fn add_state(&mut self, name: impl Into<String>) -> Result<StateId, GraphError> {
        let name = name.into();
        if self.find_state(&name).is_some() {
            return Err(GraphError::DuplicateState {
                layer: self.name.clone(),
                state: name,
            });
        }
        self.states.push(State {
            name,
            drivers: Vec::new(),
        });
        Ok(StateId(self.states.len() - 1))
    }

    pub fn add_driver(&mut self, state: StateId, driver: Driver) {
        self.states[state.0].drivers.push(driver);
    }

    pub fn add_drivers(&mut self, state: StateId, drivers: impl IntoIterator<Item = Driver>) {
        self.states[state.0].drivers.extend(drivers);
    }

    /// Adds an unconditional transition; refine it through the returned handle.
    ///
    /// Transitions out of a state are evaluated in insertion order.
    pub fn add_transition(&mut self, from: StateId, to: StateId) -> &mut Transition {
        self.transitions.push(Transition {
            from,
            to,
            conditions: SmallVec::new(),
            exit_time: None,
        });
        let last = self.transitions.len() - 1;
        &mut self.transitions[last]
    }

    /// The state a fresh runtime starts in.
    pub fn entry(&self) -> Option<StateId> {
        if self.states.is_empty() {
            None
        } else {
            Some(StateId(0))
        }
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.states.iter().position(|s| s.name == name).map(StateId)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transitions_from(&self, state: StateId) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(move |t| t.from == state)
    }

    fn referenced_parameters(&self) -> impl Iterator<Item = ParameterId> + '_ {
        let from_drivers = self
            .states
            .iter()
            .flat_map(|s| s.drivers.iter().flat_map(Driver::parameters));
        let from_conditions = self
            .transitions
            .iter()
            .flat_map(|t| t.conditions.iter().flat_map(Condition::parameters));
        from_drivers.chain(from_conditions)
    }
}

/// A complete compiled protocol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProtocolGraph {
    parameters: Vec<GraphParameter>,
    layers: Vec<Layer>,
}

impl ProtocolGraph {
    pub fn parameters(&self) -> &[GraphParameter] {
        &self.parameters
    }

    pub fn parameter(&self, id: ParameterId) -> &GraphParameter {
        &self.parameters[id.0]
    }

    pub fn find_parameter(&self, name: &str) -> Option<ParameterId> {
        self.parameters
            .iter()
            .position(|p| p.name == name)
            .map(ParameterId)
    }

    /// Parameters a compiler created, in creation order.
    pub fn generated_parameters(&self) -> impl Iterator<Item = &GraphParameter> {
        self.parameters.iter().filter(|p| p.is_generated())
    }

    /// Synced bits added by generated parameters.
    pub fn generated_cost(&self) -> u32 {
        self.generated_parameters().map(GraphParameter::bit_cost).sum()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    pub fn state_count(&self) -> usize {
        self.layers.iter().map(|l| l.states.len()).sum()
    }

    pub fn transition_count(&self) -> usize {
        self.layers.iter().map(|l| l.transitions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl fmt::Display for ProtocolGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} layers, {} states, {} transitions, {} parameters",
            self.layers.len(),
            self.state_count(),
            self.transition_count(),
            self.parameters.len()
        )
    }
}

#[cfg(test)]
mod tests;
