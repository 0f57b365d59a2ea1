//! Micro-layer parameters (trajectory sampling).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::network::ReactionNetwork;

/// How firing events are mapped onto normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clock {
    /// Gillespie waiting times divided by `horizon`.
    Gillespie,
    /// The k-th event happens at `k / step_limit`.
    Steps,
}

/// Parameters of the trajectory simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MicroParams {
    /// Stop a run once every reaction of the maximal RAF has fired.
    pub max_raf: bool,
    /// Keep a single reachable catalyst per reaction before simulating.
    pub prune_catalysts: bool,
    /// Propensity contributed by each present catalyst.
    pub k_cat: f64,
    /// Physical time mapped to normalized time 1.0 (gillespie clock).
    pub horizon: f64,
    /// Event budget per run.
    pub step_limit: usize,
    /// Time normalization.
    pub clock: Clock,
}

impl Default for MicroParams {
    fn default() -> Self {
        Self {
            max_raf: false,
            prune_catalysts: false,
            k_cat: 1.0,
            horizon: 10.0,
            step_limit: 50_000,
            clock: Clock::Gillespie,
        }
    }
}

impl MicroParams {
    /// Parses `micro_params` from a request map; missing keys take defaults.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let params: Self = serde_json::from_value(Value::Object(map.clone())).map_err(|e| {
            ValidationError::invalid("micro_params", Value::Object(map.clone()), e.to_string())
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Validates parameter ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.k_cat.is_finite() || self.k_cat <= 0.0 {
            return Err(ValidationError::invalid("micro_params.k_cat", self.k_cat, "must be finite and > 0"));
        }
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(ValidationError::invalid(
                "micro_params.horizon",
                self.horizon,
                "must be finite and > 0",
            ));
        }
        if self.step_limit == 0 {
            return Err(ValidationError::invalid("micro_params.step_limit", 0, "must be >= 1"));
        }
        Ok(())
    }

    /// Applies network-level micro options (catalyst pruning).
    ///
    /// The returned network is the one both simulated and checked for RAFs.
    #[must_use]
    pub fn prepare(&self, network: ReactionNetwork) -> ReactionNetwork {
        if self.prune_catalysts {
            network.prune_catalysts()
        } else {
            network
        }
    }
}

/// Checks snapshot times: each must be finite and within `[0, 1]`.
pub fn validate_snapshot_times(times: &[f64]) -> Result<(), ValidationError> {
    if times.is_empty() {
        return Err(ValidationError::invalid("snapshot_times", "[]", "must not be empty"));
    }
    for (i, t) in times.iter().enumerate() {
        if !t.is_finite() || !(0.0..=1.0).contains(t) {
            return Err(ValidationError::invalid(
                format!("snapshot_times[{i}]"),
                t,
                "must be within [0, 1]",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_clock_and_flags() {
        let map = json!({"clock": "steps", "max_raf": true, "step_limit": 100})
            .as_object()
            .cloned()
            .unwrap();
        let p = MicroParams::from_map(&map).unwrap();
        assert_eq!(p.clock, Clock::Steps);
        assert!(p.max_raf);
        assert!(!p.prune_catalysts);
        assert_eq!(p.step_limit, 100);
    }

    #[test]
    fn rejects_bad_values() {
        for bad in [
            json!({"k_cat": 0.0}),
            json!({"horizon": -1.0}),
            json!({"step_limit": 0}),
            json!({"clock": "wallclock"}),
            json!({"prune": true}),
        ] {
            let map = bad.as_object().cloned().unwrap();
            assert!(MicroParams::from_map(&map).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn snapshot_times_must_be_normalized() {
        validate_snapshot_times(&[0.0, 0.5, 1.0]).unwrap();
        assert!(validate_snapshot_times(&[]).is_err());
        assert!(validate_snapshot_times(&[1.2]).is_err());
        assert!(validate_snapshot_times(&[-0.1]).is_err());
        assert!(validate_snapshot_times(&[f64::NAN]).is_err());
    }
}
