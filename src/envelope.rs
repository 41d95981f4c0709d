//! The uniform `{success, data, error}` result returned by every tool.

use crate::error::ProcedureError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a tool operation.
///
/// `data` is present only on success and `error` only on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    /// A successful result carrying a serialized payload.
    ///
    /// A payload that fails to serialize becomes a failed result.
    pub fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_value(payload) {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self::failure(format!("Failed to serialize result: {}", e)),
        }
    }

    /// A failed result with a human-readable message.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: None,
            error: Some(if message.is_empty() {
                "Unknown error".to_string()
            } else {
                message
            }),
        }
    }

    /// Fold an operation outcome into an envelope.
    pub fn from_outcome<T: Serialize>(outcome: Result<T, ProcedureError>) -> Self {
        match outcome {
            Ok(payload) => Self::ok(&payload),
            Err(e) => Self::failure(e.to_string()),
        }
    }

    /// The `data.message` summary, if any.
    pub fn message(&self) -> Option<&str> {
        self.data.as_ref()?.get("message")?.as_str()
    }

    /// Render as pretty-printed JSON.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\": false, \"error\": \"Failed to serialize result: {}\"}}",
                e
            )
        })
    }
}
