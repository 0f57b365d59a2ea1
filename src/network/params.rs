//! Macro-layer parameters (network growth).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Largest accepted saturation (universe size).
pub const MAX_SATURATION: i64 = 1000;

/// Parameters of the TAP growth process.
///
/// Saturation is the target universe size. Every reaction produces one new
/// molecule, so a network at saturation `s` has `s - food_size` reactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacroParams {
    /// Seed of the growth process.
    pub seed: u64,
    /// Number of food molecules (`1..=food_size`).
    pub food_size: u32,
    /// Largest reactant-set size.
    pub max_arity: u32,
    /// Per-arity rate coefficients; `alpha[i - 1]` scales `C(Mt, i)`.
    pub alpha: Vec<f64>,
    /// Probability that a given molecule catalyzes a given reaction.
    pub catalysis_prob: f64,
    /// Growth rounds allowed before giving up.
    pub max_rounds: u32,
}

impl Default for MacroParams {
    fn default() -> Self {
        Self {
            seed: 0,
            food_size: 2,
            max_arity: 3,
            alpha: vec![0.1, 0.05, 0.0],
            catalysis_prob: 0.5,
            max_rounds: 100_000,
        }
    }
}

impl MacroParams {
    /// Parses `macro_params` from a request map; missing keys take defaults.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let params: Self = serde_json::from_value(Value::Object(map.clone())).map_err(|e| {
            ValidationError::invalid("macro_params", Value::Object(map.clone()), e.to_string())
        })?;
        params.validate()?;
        Ok(params)
    }

    /// Validates parameter ranges.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.food_size == 0 {
            return Err(ValidationError::invalid(
                "macro_params.food_size",
                self.food_size,
                "must be >= 1",
            ));
        }
        if self.max_arity == 0 {
            return Err(ValidationError::invalid(
                "macro_params.max_arity",
                self.max_arity,
                "must be >= 1",
            ));
        }
        if self.alpha.is_empty() {
            return Err(ValidationError::invalid("macro_params.alpha", "[]", "must not be empty"));
        }
        if let Some(a) = self.alpha.iter().find(|a| !a.is_finite() || **a < 0.0) {
            return Err(ValidationError::invalid(
                "macro_params.alpha",
                a,
                "coefficients must be finite and >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.catalysis_prob) {
            return Err(ValidationError::invalid(
                "macro_params.catalysis_prob",
                self.catalysis_prob,
                "must be in [0, 1]",
            ));
        }
        if self.max_rounds == 0 {
            return Err(ValidationError::invalid(
                "macro_params.max_rounds",
                self.max_rounds,
                "must be >= 1",
            ));
        }
        Ok(())
    }

    /// Rate coefficient for reactant sets of size `arity` (0 past the table).
    #[must_use]
    pub fn alpha_for(&self, arity: u32) -> f64 {
        arity
            .checked_sub(1)
            .and_then(|i| self.alpha.get(i as usize))
            .copied()
            .unwrap_or(0.0)
    }

    /// Checks a requested saturation and returns it as a universe size.
    pub fn check_saturation(&self, saturation: i64) -> Result<u32, ValidationError> {
        if saturation <= 0 {
            return Err(ValidationError::invalid("saturation", saturation, "must be positive"));
        }
        if saturation > MAX_SATURATION {
            return Err(ValidationError::invalid(
                "saturation",
                saturation,
                format!("must be <= {MAX_SATURATION}"),
            ));
        }
        if saturation <= i64::from(self.food_size) {
            return Err(ValidationError::invalid(
                "saturation",
                saturation,
                format!(
                    "must exceed food_size={} or the network has no producible molecules",
                    self.food_size
                ),
            ));
        }
        u32::try_from(saturation)
            .map_err(|_| ValidationError::invalid("saturation", saturation, "out of range"))
    }

    /// Number of reactions a network at `universe_size` contains.
    #[must_use]
    pub const fn reaction_count(&self, universe_size: u32) -> u32 {
        universe_size.saturating_sub(self.food_size)
    }
}
