//! Compilation context and latency estimates.

use paramforge_config::CompressorConfig;
use paramforge_core::{Decision, Method, BATCH_TIME_SECS};

use crate::naming::NameScope;

/// Everything a protocol compiler needs besides the decision itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolContext {
    pub names: NameScope,
    /// Dwell time of each batch on the wire.
    pub batch_time_secs: f32,
    /// Substrate ticks per second.
    pub tick_rate: f32,
}

impl Default for ProtocolContext {
    fn default() -> Self {
        Self {
            names: NameScope::default(),
            batch_time_secs: BATCH_TIME_SECS,
            tick_rate: 60.0,
        }
    }
}

impl ProtocolContext {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            names: NameScope::new(prefix),
            ..Self::default()
        }
    }

    pub fn from_config(config: &CompressorConfig) -> Self {
        Self {
            names: NameScope::new(config.name_prefix.clone()),
            batch_time_secs: config.timing.batch_time_secs,
            tick_rate: config.timing.tick_rate,
        }
    }

    pub fn with_batch_time(mut self, seconds: f32) -> Self {
        self.batch_time_secs = seconds;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: f32) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn tick_secs(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

/// Estimated time for a changed value to reach every peer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SyncLatency {
    pub min_secs: f32,
    pub max_secs: f32,
}

impl SyncLatency {
    /// Latency bounds of `decision` under `ctx`.
    ///
    /// One batch occupies the wire for the dwell time plus, on average, half
    /// a tick of spacer. A round-robin cycle visits every batch; a receiver
    /// that is maximally out of phase waits for a second cycle. The legacy
    /// sender jumps straight to a changed batch, so its best case is a
    /// single batch.
    pub fn estimate(decision: &Decision, ctx: &ProtocolContext) -> Self {
        let batches = decision.batch_count() as f32;
        let per_batch = ctx.batch_time_secs + 0.5 / ctx.tick_rate;
        let cycle = batches * per_batch;
        match decision.method {
            _ if decision.is_empty() => Self::default(),
            Method::Modern => Self {
                min_secs: cycle,
                max_secs: 2.0 * cycle,
            },
            Method::Legacy => Self {
                min_secs: per_batch,
                max_secs: 2.0 * cycle,
            },
        }
    }
}
