//! Fluent construction of generation requests.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ValidationError;

use super::{GenerateRequest, Saturation};

/// Builder for [`GenerateRequest`].
#[derive(Debug, Clone, Default)]
pub struct GenerateRequestBuilder {
    request_id: Option<Uuid>,
    simulator_id: Option<String>,
    saturation: Option<Saturation>,
    runs: Option<i64>,
    snapshot_times: Option<Vec<f64>>,
    extras: Vec<String>,
    macro_params: Map<String, Value>,
    micro_params: Map<String, Value>,
    sample_params: Map<String, Value>,
}

impl GenerateRequestBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom request id (useful for correlation).
    #[must_use]
    pub fn request_id(mut self, id: Uuid) -> Self {
        self.request_id = Some(id);
        self
    }

    /// Set the simulator to run.
    #[must_use]
    pub fn simulator_id(mut self, id: impl Into<String>) -> Self {
        self.simulator_id = Some(id.into());
        self
    }

    /// Request a single saturation level.
    #[must_use]
    pub fn saturation(mut self, saturation: i64) -> Self {
        self.saturation = Some(Saturation::Single(saturation));
        self
    }

    /// Request a saturation sweep.
    #[must_use]
    pub fn saturations(mut self, levels: impl IntoIterator<Item = i64>) -> Self {
        self.saturation = Some(Saturation::Sequence(levels.into_iter().collect()));
        self
    }

    /// Set the number of runs.
    #[must_use]
    pub fn runs(mut self, runs: i64) -> Self {
        self.runs = Some(runs);
        self
    }

    /// Set the snapshot times.
    #[must_use]
    pub fn snapshot_times(mut self, times: impl IntoIterator<Item = f64>) -> Self {
        self.snapshot_times = Some(times.into_iter().collect());
        self
    }

    /// Request an extra.
    #[must_use]
    pub fn extra(mut self, name: impl Into<String>) -> Self {
        self.extras.push(name.into());
        self
    }

    /// Set one macro parameter.
    #[must_use]
    pub fn macro_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.macro_params.insert(key.into(), value.into());
        self
    }

    /// Set one micro parameter.
    #[must_use]
    pub fn micro_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.micro_params.insert(key.into(), value.into());
        self
    }

    /// Set one sample parameter.
    #[must_use]
    pub fn sample_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.sample_params.insert(key.into(), value.into());
        self
    }

    /// Build the request. Parameter values are checked later by `validate`.
    pub fn build(self) -> Result<GenerateRequest, ValidationError> {
        let missing = |field: &str| ValidationError::MissingField {
            field: field.to_string(),
        };
        Ok(GenerateRequest {
            request_id: self.request_id.unwrap_or_else(Uuid::new_v4),
            simulator_id: self.simulator_id.ok_or_else(|| missing("simulator_id"))?,
            saturation: self.saturation.ok_or_else(|| missing("saturation"))?,
            runs: self.runs.ok_or_else(|| missing("runs"))?,
            snapshot_times: self.snapshot_times,
            extras: self.extras,
            macro_params: self.macro_params,
            micro_params: self.micro_params,
            sample_params: self.sample_params,
        })
    }
}
