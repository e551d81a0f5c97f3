//! Error normaliser: the single place a domain [`Error`] becomes an HTTP
//! response.
//!
//! Every failure in the pipeline, whether raised by a guard, a validator or
//! a handler, is rendered here exactly once. [`status_for`] is the only
//! code-to-status table in the crate.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::Value;
use tracing::{debug, error};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER, TraceId};

use super::envelope::ErrorEnvelope;

/// Message sent to clients in place of an unexpected error's own message.
pub const GENERIC_UNEXPECTED_MESSAGE: &str = "internal server error";

/// HTTP status for each error kind.
#[must_use]
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// How much of an unexpected error reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorExposure {
    /// Generic message, no details. Production behaviour.
    #[default]
    Redacted,
    /// Internal message and details. Development behaviour.
    Verbose,
}

/// Renders domain errors as error envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorNormalizer {
    exposure: ErrorExposure,
}

impl ErrorNormalizer {
    /// Build a normaliser with the given exposure policy.
    #[must_use]
    pub fn new(exposure: ErrorExposure) -> Self {
        Self { exposure }
    }

    /// Exposure policy in force.
    #[must_use]
    pub fn exposure(&self) -> ErrorExposure {
        self.exposure
    }

    /// Client-facing envelope for `error`.
    #[must_use]
    pub fn envelope(&self, error: &Error) -> ErrorEnvelope {
        let (message, details) = match error.code() {
            ErrorCode::Unauthenticated | ErrorCode::Forbidden => {
                (error.message().to_owned(), None)
            }
            ErrorCode::NotFound => (
                error.message().to_owned(),
                error.details().and_then(resource_only),
            ),
            ErrorCode::Unexpected => match self.exposure {
                ErrorExposure::Redacted => (GENERIC_UNEXPECTED_MESSAGE.to_owned(), None),
                ErrorExposure::Verbose => {
                    (error.message().to_owned(), error.details().cloned())
                }
            },
            ErrorCode::Validation | ErrorCode::Conflict => {
                (error.message().to_owned(), error.details().cloned())
            }
        };
        ErrorEnvelope {
            success: false,
            error: error.code(),
            message,
            details,
        }
    }

    /// Log `error` and render the response.
    pub fn respond(&self, error: &Error) -> HttpResponse {
        let trace_id = error
            .trace_id()
            .map(str::to_owned)
            .or_else(|| TraceId::current().map(|id| id.to_string()));
        let trace = trace_id.as_deref().unwrap_or("-");
        if error.code() == ErrorCode::Unexpected {
            error!(
                trace_id = trace,
                message = error.message(),
                details = ?error.details(),
                "unexpected error"
            );
        } else {
            debug!(trace_id = trace, code = %error.code(), "request rejected");
        }

        let mut builder = HttpResponse::build(status_for(error.code()));
        if let Some(id) = trace_id {
            builder.insert_header((TRACE_ID_HEADER, id));
        }
        builder.json(self.envelope(error))
    }
}

fn resource_only(details: &Value) -> Option<Value> {
    details
        .get("resource")
        .map(|resource| serde_json::json!({ "resource": resource }))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        ErrorNormalizer::default().respond(self)
    }
}

#[cfg(test)]
mod tests;
