//! Request JSON helpers.
//!
//! Decoding happens in two passes so that an absent required field is
//! reported as `MissingField` rather than as an opaque decoder message.

use serde_json::Value;

use crate::error::{SimError, ValidationError};

use super::GenerateRequest;

const REQUIRED_FIELDS: [&str; 3] = ["simulator_id", "saturation", "runs"];

/// Serialize a request to pretty JSON.
pub fn to_json_pretty(request: &GenerateRequest) -> Result<String, SimError> {
    serde_json::to_string_pretty(request).map_err(|e| SimError::internal(format!("serialize request: {e}")))
}

/// Deserialize a request from JSON.
///
/// Callers should then invoke `request.validate(..)` before executing.
pub fn from_json(s: &str) -> Result<GenerateRequest, ValidationError> {
    let doc: Value = serde_json::from_str(s).map_err(|e| ValidationError::MalformedRequest {
        reason: e.to_string(),
    })?;
    let Some(object) = doc.as_object() else {
        return Err(ValidationError::MalformedRequest {
            reason: "request must be a JSON object".to_string(),
        });
    };
    if let Some(field) = REQUIRED_FIELDS.iter().find(|f| !object.contains_key(**f)) {
        return Err(ValidationError::MissingField {
            field: (*field).to_string(),
        });
    }
    serde_json::from_value(doc).map_err(|e| ValidationError::MalformedRequest {
        reason: e.to_string(),
    })
}
