//! Engine and runtime configuration.
//!
//! Both sections deserialize from JSON with every key optional; missing keys
//! take the defaults below. A configuration file looks like:
//!
//! ```json
//! {
//!   "engine": { "max_runs": 500 },
//!   "runtime": { "heavy_workers": 4, "queue_capacity": 64 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::network::MAX_SATURATION;

/// Limits applied to every request before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Largest accepted `runs`.
    pub max_runs: usize,
    /// Largest accepted number of snapshot times.
    pub max_snapshot_times: usize,
    /// Largest accepted saturation sequence.
    pub max_sequence_len: usize,
    /// Run the `runs` dimension on the rayon pool.
    pub parallel_runs: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_runs: 10_000,
            max_snapshot_times: 1_024,
            max_sequence_len: 64,
            parallel_runs: true,
        }
    }
}

impl EngineConfig {
    /// Validates the limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_runs == 0 {
            return Err(ValidationError::invalid("engine.max_runs", 0, "must be >= 1"));
        }
        if self.max_snapshot_times == 0 {
            return Err(ValidationError::invalid("engine.max_snapshot_times", 0, "must be >= 1"));
        }
        if self.max_sequence_len == 0 {
            return Err(ValidationError::invalid("engine.max_sequence_len", 0, "must be >= 1"));
        }
        Ok(())
    }
}

/// Worker pool sizing for [`SimRuntime`](crate::engine::SimRuntime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Workers serving cheap requests.
    pub light_workers: usize,
    /// Workers serving expensive requests.
    pub heavy_workers: usize,
    /// Maximum queued jobs per pool.
    pub queue_capacity: usize,
    /// Estimated cost (runs times total saturation) above which a request is heavy.
    pub heavy_threshold: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            light_workers: 2,
            heavy_workers: 2,
            queue_capacity: 1024,
            heavy_threshold: 100 * MAX_SATURATION.unsigned_abs(),
        }
    }
}

impl RuntimeConfig {
    /// Validates pool sizes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.light_workers == 0 {
            return Err(ValidationError::invalid("runtime.light_workers", 0, "must be >= 1"));
        }
        if self.heavy_workers == 0 {
            return Err(ValidationError::invalid("runtime.heavy_workers", 0, "must be >= 1"));
        }
        if self.queue_capacity == 0 {
            return Err(ValidationError::invalid("runtime.queue_capacity", 0, "must be >= 1"));
        }
        Ok(())
    }
}

/// Full configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Engine limits.
    pub engine: EngineConfig,
    /// Runtime pools.
    pub runtime: RuntimeConfig,
}

impl Config {
    /// Parses and validates a JSON configuration document.
    pub fn from_json(s: &str) -> Result<Self, ValidationError> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| ValidationError::invalid("config", "<document>", e.to_string()))?;
        config.engine.validate()?;
        config.runtime.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ValidationError::invalid("config", path.display(), e.to_string()))?;
        Self::from_json(&text)
    }
}
