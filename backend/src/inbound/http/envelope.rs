//! Wire envelopes shared by every JSON response.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ErrorCode;

/// Success payload: `{ "success": true, "data": .., "message"?: .. }`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SuccessEnvelope {
    #[schema(example = true)]
    pub success: bool,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessEnvelope {
    /// Wrap handler data.
    pub fn new(data: Value, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            message,
        }
    }
}

/// Failure payload: `{ "success": false, "error": kind, "message", "details"? }`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    #[schema(example = false)]
    pub success: bool,
    pub error: ErrorCode,
    #[schema(example = "insufficient permissions")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
