//! Method dispatch.
//!
//! Logging levels:
//! - **INFO**: One `protocol_compiled` event per compiled decision

use paramforge_core::{Decision, Method};
use tracing::info;

use crate::context::{ProtocolContext, SyncLatency};
use crate::error::GraphError;
use crate::graph::ProtocolGraph;
use crate::legacy::compile_legacy;
use crate::modern::compile_modern;

/// A decision realized as a graph, with its latency bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProtocol {
    pub graph: ProtocolGraph,
    pub method: Method,
    pub batch_count: usize,
    pub latency: SyncLatency,
}

/// Compiles `decision` with the one compiler its method selects.
pub fn compile(decision: &Decision, ctx: &ProtocolContext) -> Result<CompiledProtocol, GraphError> {
    let graph = match decision.method {
        Method::Modern => compile_modern(decision, ctx)?,
        Method::Legacy => compile_legacy(decision, ctx)?,
    };
    let batch_count = decision.batch_count();
    let latency = SyncLatency::estimate(decision, ctx);

    info!(
        event = "protocol_compiled",
        method = %decision.method,
        batches = batch_count,
        states = graph.state_count(),
        transitions = graph.transition_count(),
        parameters = graph.generated_parameters().count(),
        synced_bits = graph.generated_cost(),
    );

    Ok(CompiledProtocol {
        graph,
        method: decision.method,
        batch_count,
        latency,
    })
}

#[cfg(test)]
mod tests {
    use paramforge_core::SyncedVariable;

    use super::*;

    fn decision(method: Method) -> Decision {
        let compressed = (0..12)
            .map(|i| SyncedVariable::bool(format!("b{i}")))
            .collect();
        Decision::new(compressed, method).with_slots(0, 4)
    }

    #[test]
    fn test_dispatches_on_method() {
        let ctx = ProtocolContext::default();

        let modern = compile(&decision(Method::Modern), &ctx).unwrap();
        let legacy = compile(&decision(Method::Legacy), &ctx).unwrap();

        assert!(modern.graph.find_parameter(&ctx.names.index_bit(0)).is_some());
        assert!(modern.graph.find_parameter(&ctx.names.pointer()).is_none());
        assert!(legacy.graph.find_parameter(&ctx.names.pointer()).is_some());
        assert_eq!(modern.method, Method::Modern);
        assert_eq!(legacy.method, Method::Legacy);
        assert_eq!(modern.batch_count, 3);
    }

    #[test]
    fn test_latency_attached() {
        let ctx = ProtocolContext::default();
        let decision = decision(Method::Modern);
        let compiled = compile(&decision, &ctx).unwrap();

        assert_eq!(compiled.latency, SyncLatency::estimate(&decision, &ctx));
        assert!(compiled.latency.min_secs > 0.3);
    }
}
