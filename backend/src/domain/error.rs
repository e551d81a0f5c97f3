//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP error normaliser is the only
//! place that turns them into status codes and wire envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::TraceId;

/// Stable machine-readable error kind describing the failure category.
///
/// The serialised names are part of the public envelope contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
pub enum ErrorCode {
    /// Input failed schema validation.
    #[serde(rename = "ValidationError")]
    Validation,
    /// No valid session credential accompanied the request.
    #[serde(rename = "UnauthenticatedError")]
    Unauthenticated,
    /// The caller's role does not satisfy the endpoint requirement.
    #[serde(rename = "ForbiddenError")]
    Forbidden,
    /// The route or resource does not exist.
    #[serde(rename = "NotFoundError")]
    NotFound,
    /// The request collides with existing state, such as a unique field.
    #[serde(rename = "ConflictError")]
    Conflict,
    /// Anything not covered by the other kinds.
    #[serde(rename = "UnexpectedError")]
    Unexpected,
}

impl ErrorCode {
    /// Wire name of the kind, as it appears in the `error` envelope field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Unauthenticated => "UnauthenticatedError",
            Self::Forbidden => "ForbiddenError",
            Self::NotFound => "NotFoundError",
            Self::Conflict => "ConflictError",
            Self::Unexpected => "UnexpectedError",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error payload.
///
/// Captures the ambient [`TraceId`] on construction so the normaliser can
/// correlate the log line with the response header.
///
/// # Examples
/// ```
/// use storefront::domain::{Error, ErrorCode};
/// use serde_json::json;
///
/// let err = Error::conflict("category name already exists")
///     .with_details(json!({ "field": "name" }));
/// assert_eq!(err.code(), ErrorCode::Conflict);
/// assert!(err.details().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

impl Error {
    /// Create a new error of the given kind.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        }
    }

    /// Stable machine-readable error kind.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message as raised. Unexpected errors are redacted before leaving the
    /// process in production mode.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Trace identifier captured when the error was raised.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Supplementary structured details.
    #[must_use]
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the captured trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthenticated`].
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::Unexpected`].
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unexpected, message)
    }

    /// Missing resource, carrying only the resource identifier as detail.
    pub fn resource_not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::not_found("resource not found").with_details(serde_json::json!({
            "resource": resource,
        }))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
