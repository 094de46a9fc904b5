//! ParamForge Protocol
//!
//! Turns a compression [`Decision`](paramforge_core::Decision) into a
//! time-division multiplexing protocol expressed as a state-machine graph:
//! - An explicit graph model and builder ([`ProtocolGraph`], [`GraphBuilder`])
//! - Deterministic, prefixed naming ([`NameScope`])
//! - The round-robin, latched modern compiler ([`compile_modern`])
//! - The priority/shortcut legacy compiler ([`compile_legacy`])
//! - A tick-driven runtime for checking protocols without a host ([`GraphRuntime`])
//!
//! # Example
//!
//! ```
//! use paramforge_core::{Decision, Method, SyncedVariable};
//! use paramforge_protocol::{compile, PeerPair, ProtocolContext};
//!
//! let compressed = (0..4).map(|i| SyncedVariable::int(format!("i{i}"))).collect();
//! let decision = Decision::new(compressed, Method::Modern).with_slots(2, 0);
//! let compiled = compile(&decision, &ProtocolContext::default()).unwrap();
//!
//! let mut peers = PeerPair::new(&compiled.graph, 60.0).unwrap();
//! peers.sender.set("i3", 99.0).unwrap();
//! peers.run(30);
//! assert_eq!(peers.receiver.get("i3"), Some(99.0));
//! ```

pub mod compiler;
pub mod context;
pub mod error;
pub mod graph;
pub mod legacy;
pub mod modern;
pub mod naming;
pub mod runtime;

mod slots;

pub use compiler::{compile, CompiledProtocol};
pub use context::{ProtocolContext, SyncLatency};
pub use error::GraphError;
pub use graph::{
    Condition, Driver, GraphBuilder, GraphParameter, Layer, ParameterId, ParameterOrigin,
    ProtocolGraph, Remap, State, StateId, Transition, IS_LOCAL,
};
pub use legacy::compile_legacy;
pub use modern::compile_modern;
pub use naming::NameScope;
pub use runtime::{GraphRuntime, PeerPair};
