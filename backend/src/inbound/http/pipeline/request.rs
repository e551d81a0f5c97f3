//! Handler-facing request and reply types.

use actix_web::HttpResponse;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::{Error, Identity, SessionToken};
use crate::inbound::http::envelope::SuccessEnvelope;
use crate::inbound::http::guards::UNAUTHENTICATED_MESSAGE;

/// Request state handed to a [`Handler`](super::Handler).
///
/// Every slot holds normalised values: defaults applied, coercions done and
/// undeclared fields dropped.
#[derive(Debug, Clone, Default)]
pub struct ValidatedRequest {
    pub(super) identity: Option<Identity>,
    pub(super) credential: Option<SessionToken>,
    pub(super) params: Map<String, Value>,
    pub(super) query: Map<String, Value>,
    pub(super) body: Map<String, Value>,
}

fn decode<T: DeserializeOwned>(slot: &str, map: &Map<String, Value>) -> Result<T, Error> {
    serde_json::from_value(Value::Object(map.clone())).map_err(|err| {
        Error::unexpected(format!(
            "validated {slot} does not fit {}: {err}",
            std::any::type_name::<T>()
        ))
    })
}

impl ValidatedRequest {
    /// Identity resolved by the authentication guard, if it ran.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Identity, or an authentication error for public endpoints.
    pub fn require_identity(&self) -> Result<&Identity, Error> {
        self.identity
            .as_ref()
            .ok_or_else(|| Error::unauthenticated(UNAUTHENTICATED_MESSAGE))
    }

    /// Credential presented with the request.
    pub fn credential(&self) -> Option<&SessionToken> {
        self.credential.as_ref()
    }

    /// Normalised path parameters.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Normalised query values.
    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    /// Normalised body fields.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Deserialise the body into a DTO.
    ///
    /// The rule set has already enforced the shape, so a mismatch here is a
    /// programming error and surfaces as an unexpected error.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        decode("body", &self.body)
    }

    /// Deserialise the query into a DTO.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        decode("query", &self.query)
    }

    /// Read a UUID path parameter.
    pub fn param_uuid(&self, name: &str) -> Result<Uuid, Error> {
        self.params
            .get(name)
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| Error::validation(format!("validation failed for: {name}")))
    }
}

/// Successful handler outcome, rendered as a success envelope.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    data: Value,
    message: Option<String>,
    cookies: Vec<Cookie<'static>>,
}

impl Reply {
    /// `200 OK` with `data`.
    pub fn ok(data: impl Serialize) -> Result<Self, Error> {
        Self::with_status(StatusCode::OK, data)
    }

    /// `201 Created` with `data`.
    pub fn created(data: impl Serialize) -> Result<Self, Error> {
        Self::with_status(StatusCode::CREATED, data)
    }

    /// Reply with an explicit status.
    pub fn with_status(status: StatusCode, data: impl Serialize) -> Result<Self, Error> {
        let data = serde_json::to_value(data)
            .map_err(|err| Error::unexpected(format!("failed to serialise reply: {err}")))?;
        Ok(Self {
            status,
            data,
            message: None,
            cookies: Vec::new(),
        })
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set a cookie on the response.
    #[must_use]
    pub fn cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Status code of the reply.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Render the success envelope.
    pub fn into_response(self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status);
        for cookie in self.cookies {
            builder.cookie(cookie);
        }
        builder.json(SuccessEnvelope::new(self.data, self.message))
    }
}
