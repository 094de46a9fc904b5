//! Configuration system for ParamForge.
//!
//! Load compressor configuration from TOML or YAML files to control the bit
//! budget, protocol timing, method preference, and failure policy without
//! code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use paramforge_config::{CompressorConfig, FailurePolicy, MethodPreference};
//!
//! let config = CompressorConfig::from_toml_str(r#"
//!     max_cost = 128
//!     method = "legacy"
//!     failure_policy = "best_effort"
//!
//!     [timing]
//!     batch_time_secs = 0.2
//! "#).unwrap();
//!
//! assert_eq!(config.max_cost, 128);
//! assert_eq!(config.method, MethodPreference::Legacy);
//! assert_eq!(config.failure_policy, FailurePolicy::BestEffort);
//! assert_eq!(config.timing.tick_rate, 60.0);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use paramforge_config::CompressorConfig;
//!
//! let config = CompressorConfig::load("paramforge.toml").unwrap_or_default();
//! assert_eq!(config.max_cost, 256);
//! ```

use std::path::Path;

use paramforge_core::{Method, BATCH_TIME_SECS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Platform limit on synced bits per avatar.
pub const DEFAULT_MAX_COST: u32 = 256;

/// Prefix under which every generated graph name is placed.
pub const DEFAULT_NAME_PREFIX: &str = "PF/Compress";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main compressor configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct CompressorConfig {
    /// Synced-bit budget.
    pub max_cost: u32,

    /// Preferred protocol.
    pub method: MethodPreference,

    /// What to do when no candidate fits the budget.
    pub failure_policy: FailurePolicy,

    /// Protocol timing.
    pub timing: TimingConfig,

    /// Solver tuning.
    pub solver: SolverTuning,

    /// Prefix for every generated parameter, layer and state name.
    pub name_prefix: String,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            max_cost: DEFAULT_MAX_COST,
            method: MethodPreference::default(),
            failure_policy: FailurePolicy::default(),
            timing: TimingConfig::default(),
            solver: SolverTuning::default(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }
}

impl CompressorConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the synced-bit budget.
    pub fn with_max_cost(mut self, max_cost: u32) -> Self {
        self.max_cost = max_cost;
        self
    }

    /// Sets the preferred protocol.
    pub fn with_method(mut self, method: MethodPreference) -> Self {
        self.method = method;
        self
    }

    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the generated-name prefix.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Sets the substrate tick rate.
    pub fn with_tick_rate(mut self, tick_rate: f32) -> Self {
        self.timing.tick_rate = tick_rate;
        self
    }

    /// Checks ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cost == 0 {
            return Err(ConfigError::Invalid("max_cost must be positive".into()));
        }
        if !(self.timing.batch_time_secs > 0.0) {
            return Err(ConfigError::Invalid(
                "timing.batch_time_secs must be positive".into(),
            ));
        }
        if !(self.timing.tick_rate > 0.0) {
            return Err(ConfigError::Invalid("timing.tick_rate must be positive".into()));
        }
        if self.solver.acceptable_latency_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "solver.acceptable_latency_secs must not be negative".into(),
            ));
        }
        if self.name_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("name_prefix must not be empty".into()));
        }
        Ok(())
    }
}

/// Protocol preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodPreference {
    /// Round-robin indexed protocol.
    #[default]
    Modern,

    /// Priority/shortcut protocol; falls back to modern above 255 batches.
    Legacy,
}

impl From<MethodPreference> for Method {
    fn from(preference: MethodPreference) -> Self {
        match preference {
            MethodPreference::Modern => Method::Modern,
            MethodPreference::Legacy => Method::Legacy,
        }
    }
}

/// Behavior when even maximum compression exceeds the budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the build.
    #[default]
    Fail,

    /// Ask the caller to confirm applying the best result anyway.
    Ask,

    /// Apply the best result without asking.
    BestEffort,
}

/// Protocol timing configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct TimingConfig {
    /// Dwell time of each batch on the wire.
    pub batch_time_secs: f32,

    /// Substrate ticks per second, used for latency estimates.
    pub tick_rate: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            batch_time_secs: BATCH_TIME_SECS,
            tick_rate: 60.0,
        }
    }
}

impl TimingConfig {
    /// Duration of one substrate tick.
    pub fn tick_secs(&self) -> f32 {
        1.0 / self.tick_rate
    }
}

/// Solver tuning.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SolverTuning {
    /// A feasible candidate at or below this latency ends the filter scan.
    pub acceptable_latency_secs: f32,
}

impl Default for SolverTuning {
    fn default() -> Self {
        Self {
            acceptable_latency_secs: 1.0,
        }
    }
}
