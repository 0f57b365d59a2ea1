//! Sampling parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::simulation::validate_snapshot_times;

/// Sampling parameters: run seeds and snapshot times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleParams {
    /// Base seed; run `i` uses `seed + i`.
    pub seed: u64,
    /// Explicit per-run seeds; overrides `seed` and must have one entry per run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeds: Option<Vec<u64>>,
    /// Snapshot times, used when the request has no top-level list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_times: Option<Vec<f64>>,
}

impl SampleParams {
    /// Parses `sample_params` from a request map.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let params: Self = serde_json::from_value(Value::Object(map.clone()))
            .map_err(|e| ValidationError::invalid("sample_params", Value::Object(map.clone()), e.to_string()))?;
        if let Some(times) = &params.snapshot_times {
            validate_snapshot_times(times).map_err(|err| match err {
                ValidationError::InvalidParameter { name, value, reason } => ValidationError::InvalidParameter {
                    name: format!("sample_params.{name}"),
                    value,
                    reason,
                },
                other => other,
            })?;
        }
        Ok(params)
    }

    /// Seed of every run, in run order.
    pub fn run_seeds(&self, runs: usize) -> Result<Vec<u64>, ValidationError> {
        match &self.seeds {
            Some(seeds) if seeds.len() != runs => Err(ValidationError::invalid(
                "sample_params.seeds",
                seeds.len(),
                format!("expected one seed per run ({runs})"),
            )),
            Some(seeds) => Ok(seeds.clone()),
            None => Ok((0..runs as u64).map(|i| self.seed.wrapping_add(i)).collect()),
        }
    }
}
