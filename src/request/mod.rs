//! Generation requests.
//!
//! A [`GenerateRequest`] is the JSON contract between callers and the
//! engine. It is decoded leniently enough to report precise errors
//! (missing fields, out-of-range values) and then turned into a
//! [`ValidatedRequest`] in which every parameter map has been parsed, every
//! limit checked, and every run seed resolved.

mod builder;
mod sample;
mod serialization;

pub use builder::GenerateRequestBuilder;
pub use sample::SampleParams;
pub use serialization::{from_json, to_json_pretty};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::ValidationError;
use crate::network::MacroParams;
use crate::simulation::{validate_snapshot_times, MicroParams};

/// Snapshot times used when the request names none.
pub const DEFAULT_SNAPSHOT_TIMES: [f64; 1] = [1.0];

/// A single saturation level or a sweep over several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Saturation {
    /// One network size.
    Single(i64),
    /// One entry per listed size, all grown from the same process.
    Sequence(Vec<i64>),
}

impl Saturation {
    /// Levels in request order.
    #[must_use]
    pub fn levels(&self) -> Vec<i64> {
        match self {
            Self::Single(s) => vec![*s],
            Self::Sequence(list) => list.clone(),
        }
    }

    /// True for the list form.
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence(_))
    }
}

/// A generation request as received on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateRequest {
    /// Correlation id; generated when absent.
    #[serde(default = "Uuid::new_v4")]
    pub request_id: Uuid,
    /// Registered simulator to run.
    pub simulator_id: String,
    /// Network size(s).
    pub saturation: Saturation,
    /// Independent runs per saturation.
    pub runs: i64,
    /// Normalized snapshot times; takes precedence over `sample_params.snapshot_times`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_times: Option<Vec<f64>>,
    /// Names of extras to compute.
    #[serde(default)]
    pub extras: Vec<String>,
    /// Network growth parameters.
    #[serde(default)]
    pub macro_params: Map<String, Value>,
    /// Trajectory parameters.
    #[serde(default)]
    pub micro_params: Map<String, Value>,
    /// Sampling parameters.
    #[serde(default)]
    pub sample_params: Map<String, Value>,
}

impl GenerateRequest {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> GenerateRequestBuilder {
        GenerateRequestBuilder::new()
    }

    /// Parses every parameter map and checks every limit.
    pub fn validate(&self, config: &EngineConfig) -> Result<ValidatedRequest, ValidationError> {
        if self.simulator_id.trim().is_empty() {
            return Err(ValidationError::invalid("simulator_id", "\"\"", "must not be empty"));
        }

        let runs = usize::try_from(self.runs)
            .ok()
            .filter(|r| *r >= 1)
            .ok_or_else(|| ValidationError::invalid("runs", self.runs, "must be >= 1"))?;
        if runs > config.max_runs {
            return Err(ValidationError::invalid(
                "runs",
                runs,
                format!("must be <= {}", config.max_runs),
            ));
        }

        let macro_params = MacroParams::from_map(&self.macro_params)?;
        let micro_params = MicroParams::from_map(&self.micro_params)?;
        let sample_params = SampleParams::from_map(&self.sample_params)?;

        let saturations = self.saturation.levels();
        if saturations.is_empty() {
            return Err(ValidationError::invalid("saturation", "[]", "must name at least one level"));
        }
        if saturations.len() > config.max_sequence_len {
            return Err(ValidationError::invalid(
                "saturation",
                saturations.len(),
                format!("sequence longer than {}", config.max_sequence_len),
            ));
        }
        for s in &saturations {
            macro_params.check_saturation(*s)?;
        }

        let snapshot_times = self
            .snapshot_times
            .clone()
            .or_else(|| sample_params.snapshot_times.clone())
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_TIMES.to_vec());
        validate_snapshot_times(&snapshot_times)?;
        if snapshot_times.len() > config.max_snapshot_times {
            return Err(ValidationError::invalid(
                "snapshot_times",
                snapshot_times.len(),
                format!("more than {} entries", config.max_snapshot_times),
            ));
        }

        let seeds = sample_params.run_seeds(runs)?;

        Ok(ValidatedRequest {
            request_id: self.request_id,
            simulator_id: self.simulator_id.clone(),
            saturation: self.saturation.clone(),
            saturations,
            runs,
            snapshot_times,
            extras: self.extras.clone(),
            macro_params,
            micro_params,
            sample_params,
            seeds,
        })
    }
}

/// A request whose parameters have all been parsed and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Correlation id.
    pub request_id: Uuid,
    /// Simulator to run.
    pub simulator_id: String,
    /// Saturation as requested (single or sequence).
    pub saturation: Saturation,
    /// Saturation levels in request order.
    pub saturations: Vec<i64>,
    /// Runs per saturation.
    pub runs: usize,
    /// Resolved snapshot times.
    pub snapshot_times: Vec<f64>,
    /// Requested extras, unchecked.
    pub extras: Vec<String>,
    /// Parsed macro parameters.
    pub macro_params: MacroParams,
    /// Parsed micro parameters.
    pub micro_params: MicroParams,
    /// Parsed sample parameters.
    pub sample_params: SampleParams,
    /// Seed of each run.
    pub seeds: Vec<u64>,
}

impl ValidatedRequest {
    /// Rough cost used for routing: runs times total saturation.
    #[must_use]
    pub fn estimated_cost(&self) -> u64 {
        let total: u64 = self.saturations.iter().map(|s| s.unsigned_abs()).sum();
        total.saturating_mul(self.runs as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(v: Value) -> GenerateRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn saturation_accepts_int_or_list() {
        let single = request(json!({"simulator_id": "raf", "saturation": 10, "runs": 1}));
        assert_eq!(single.saturation, Saturation::Single(10));
        assert!(!single.saturation.is_sequence());

        let sweep = request(json!({"simulator_id": "raf", "saturation": [10, 20], "runs": 1}));
        assert_eq!(sweep.saturation.levels(), vec![10, 20]);
        assert!(sweep.saturation.is_sequence());
    }

    #[test]
    fn validate_resolves_defaults() {
        let req = request(json!({"simulator_id": "raf", "saturation": 10, "runs": 3}));
        let v = req.validate(&EngineConfig::default()).unwrap();
        assert_eq!(v.runs, 3);
        assert_eq!(v.snapshot_times, vec![1.0]);
        assert_eq!(v.seeds, vec![0, 1, 2]);
        assert_eq!(v.macro_params, MacroParams::default());
        assert_eq!(v.estimated_cost(), 30);
    }

    #[test]
    fn top_level_snapshot_times_win() {
        let req = request(json!({
            "simulator_id": "raf", "saturation": 10, "runs": 1,
            "snapshot_times": [0.0, 0.5],
            "sample_params": {"snapshot_times": [1.0]}
        }));
        let v = req.validate(&EngineConfig::default()).unwrap();
        assert_eq!(v.snapshot_times, vec![0.0, 0.5]);

        let nested = request(json!({
            "simulator_id": "raf", "saturation": 10, "runs": 1,
            "sample_params": {"snapshot_times": [0.25]}
        }));
        assert_eq!(nested.validate(&EngineConfig::default()).unwrap().snapshot_times, vec![0.25]);
    }

    #[test]
    fn validate_reports_offending_parameter() {
        let cases = [
            (json!({"simulator_id": "raf", "saturation": 10, "runs": 0}), "runs"),
            (json!({"simulator_id": "raf", "saturation": -5, "runs": 1}), "saturation"),
            (json!({"simulator_id": "raf", "saturation": [], "runs": 1}), "saturation"),
            (json!({"simulator_id": "raf", "saturation": 10, "runs": 1, "snapshot_times": [2.0]}), "snapshot_times[0]"),
            (json!({"simulator_id": "", "saturation": 10, "runs": 1}), "simulator_id"),
            (json!({"simulator_id": "raf", "saturation": 10, "runs": 1, "micro_params": {"bogus": 1}}), "micro_params"),
            (
                json!({
                    "simulator_id": "raf", "saturation": 10, "runs": 1,
                    "snapshot_times": [0.5],
                    "sample_params": {"snapshot_times": [5.0, -3.0]}
                }),
                "sample_params.snapshot_times[0]",
            ),
            (
                json!({"simulator_id": "raf", "saturation": 10, "runs": 1, "sample_params": {"snapshot_times": []}}),
                "sample_params.snapshot_times",
            ),
        ];
        for (doc, expected) in cases {
            let err = request(doc.clone()).validate(&EngineConfig::default()).unwrap_err();
            let ValidationError::InvalidParameter { name, .. } = &err else {
                panic!("{doc}: expected InvalidParameter, got {err:?}");
            };
            assert_eq!(name, expected, "{doc}");
        }
    }

    #[test]
    fn engine_limits_apply() {
        let config = EngineConfig {
            max_runs: 2,
            max_sequence_len: 1,
            ..EngineConfig::default()
        };
        let many_runs = request(json!({"simulator_id": "raf", "saturation": 10, "runs": 3}));
        assert!(many_runs.validate(&config).is_err());
        let long_sweep = request(json!({"simulator_id": "raf", "saturation": [10, 12], "runs": 1}));
        assert!(long_sweep.validate(&config).is_err());
    }

    #[test]
    fn unknown_top_level_keys_are_rejected() {
        let doc = json!({"simulator_id": "raf", "saturation": 10, "runs": 1, "sed": 3});
        assert!(serde_json::from_value::<GenerateRequest>(doc).is_err());
    }
}
