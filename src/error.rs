//! Error types for rafsim.
//!
//! All errors are strongly typed using thiserror so callers can match on the
//! exact failure (bad input, generation failure, divergence, routing miss)
//! and reproduce it from the reported parameter and value.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors raised before any simulation work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A parameter is malformed or out of range.
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name (dotted for nested maps, e.g. `macro_params.alpha`).
        name: String,
        /// Offending value, rendered as JSON text.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required field is missing.
    #[error("Required field '{field}' is missing")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// The request document could not be decoded at all.
    #[error("Malformed request: {reason}")]
    MalformedRequest {
        /// Decoder message.
        reason: String,
    },
}

impl ValidationError {
    /// Creates an `InvalidParameter` error.
    pub fn invalid(name: impl Into<String>, value: impl Display, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while executing a valid request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("Generation failed at saturation {saturation}: {reason}")]
    Generation {
        saturation: i64,
        reason: String,
    },

    #[error("Simulation diverged in run {run} (seed {seed}): exceeded step limit {step_limit} without stabilizing")]
    SimulationDiverged {
        run: usize,
        seed: u64,
        step_limit: usize,
    },

    #[error("Unsupported extra: '{name}'")]
    UnsupportedExtra {
        name: String,
    },

    #[error("Unknown simulator: '{id}'")]
    UnknownSimulator {
        id: String,
    },

    #[error("Simulator '{id}' is already registered")]
    DuplicateSimulator {
        id: String,
    },

    #[error("Queue full on {pool} pool (capacity {capacity})")]
    QueueFull {
        pool: String,
        capacity: usize,
    },

    #[error("Worker pool {pool} disconnected")]
    Disconnected {
        pool: String,
    },

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },
}

/// Top-level error type for rafsim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl SimError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if this error is retryable.
    ///
    /// Every failure of the engine itself is a pure function of the request
    /// and its seeds, so only runtime back-pressure is worth retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::Internal { .. } => false,
            Self::Execution(e) => matches!(
                e,
                ExecutionError::QueueFull { .. } | ExecutionError::Timeout { .. }
            ),
        }
    }

    /// Stable machine-readable kind, used in [`ErrorDetail`].
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(ValidationError::InvalidParameter { .. }) => "invalid_parameter",
            Self::Validation(ValidationError::MissingField { .. }) => "missing_field",
            Self::Validation(ValidationError::MalformedRequest { .. }) => "malformed_request",
            Self::Execution(ExecutionError::Generation { .. }) => "generation",
            Self::Execution(ExecutionError::SimulationDiverged { .. }) => "simulation_diverged",
            Self::Execution(ExecutionError::UnsupportedExtra { .. }) => "unsupported_extra",
            Self::Execution(ExecutionError::UnknownSimulator { .. }) => "unknown_simulator",
            Self::Execution(ExecutionError::DuplicateSimulator { .. }) => "duplicate_simulator",
            Self::Execution(ExecutionError::QueueFull { .. }) => "queue_full",
            Self::Execution(ExecutionError::Disconnected { .. }) => "disconnected",
            Self::Execution(ExecutionError::Timeout { .. }) => "timeout",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Result type alias for rafsim operations.
pub type SimResult<T> = Result<T, SimError>;

/// Serializable, structured form of an error for response payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable kind (see [`SimError::kind`]).
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Offending parameter or extra name, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Offending value, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl From<&SimError> for ErrorDetail {
    fn from(err: &SimError) -> Self {
        let (parameter, value) = match err {
            SimError::Validation(ValidationError::InvalidParameter { name, value, .. }) => {
                (Some(name.clone()), Some(value.clone()))
            }
            SimError::Validation(ValidationError::MissingField { field }) => (Some(field.clone()), None),
            SimError::Execution(ExecutionError::UnsupportedExtra { name }) => {
                (Some("extras".to_string()), Some(name.clone()))
            }
            SimError::Execution(ExecutionError::UnknownSimulator { id }) => {
                (Some("simulator_id".to_string()), Some(id.clone()))
            }
            SimError::Execution(ExecutionError::Generation { saturation, .. }) => {
                (Some("saturation".to_string()), Some(saturation.to_string()))
            }
            SimError::Execution(ExecutionError::SimulationDiverged { seed, .. }) => {
                (Some("seed".to_string()), Some(seed.to_string()))
            }
            _ => (None, None),
        };
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            parameter,
            value,
        }
    }
}

impl From<SimError> for ErrorDetail {
    fn from(err: SimError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message_names_parameter_and_value() {
        let err = ValidationError::invalid("runs", 0, "must be >= 1");
        let msg = format!("{err}");
        assert!(msg.contains("'runs'"));
        assert!(msg.contains("= 0"));
        assert!(msg.contains("must be >= 1"));
    }

    #[test]
    fn test_execution_error_diverged() {
        let err = ExecutionError::SimulationDiverged {
            run: 3,
            seed: 45,
            step_limit: 10,
        };
        let msg = format!("{err}");
        assert!(msg.contains("run 3"));
        assert!(msg.contains("seed 45"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn test_sim_error_from_validation() {
        let err: SimError = ValidationError::MissingField {
            field: "saturation".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), "missing_field");
    }

    #[test]
    fn test_sim_error_retryable() {
        let diverged: SimError = ExecutionError::SimulationDiverged {
            run: 0,
            seed: 1,
            step_limit: 5,
        }
        .into();
        assert!(!diverged.is_retryable());

        let full: SimError = ExecutionError::QueueFull {
            pool: "heavy".to_string(),
            capacity: 4,
        }
        .into();
        assert!(full.is_retryable());

        let internal = SimError::internal("unexpected state");
        assert!(internal.is_internal());
        assert!(!internal.is_retryable());
    }

    #[test]
    fn test_error_detail_for_unsupported_extra() {
        let err: SimError = ExecutionError::UnsupportedExtra {
            name: "bogus".to_string(),
        }
        .into();
        let detail = ErrorDetail::from(&err);
        assert_eq!(detail.kind, "unsupported_extra");
        assert_eq!(detail.parameter.as_deref(), Some("extras"));
        assert_eq!(detail.value.as_deref(), Some("bogus"));
        assert!(detail.message.contains("bogus"));
    }

    #[test]
    fn test_error_detail_skips_empty_fields_in_json() {
        let detail = ErrorDetail::from(SimError::internal("boom"));
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("parameter").is_none());
        assert_eq!(json["kind"], "internal");
    }
}
