//! Request pipeline: sanitise, authenticate, authorise, validate, handle.
//!
//! [`Pipeline::dispatch`] runs the stages declared by an [`Endpoint`] in a
//! fixed order. The first failure short-circuits to the error normaliser,
//! so a request produces exactly one envelope and the handler only ever
//! sees input that passed every stage.
//!
//! Malformed query strings and bodies are recorded when the request is read
//! but only reported at the validation stage, so an anonymous caller
//! sending garbage to a guarded endpoint still gets `401`, not `400`. The
//! same holds for bodies over the pipeline's size limit.

mod endpoint;
mod request;

pub use endpoint::{Access, Endpoint, FnHandler, Handler, handler_fn};
pub use request::{Reply, ValidatedRequest};

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::error::PayloadError;
use actix_web::web::{Bytes, BytesMut, Query};
use actix_web::{HttpRequest, HttpResponse};
use futures_util::{Stream, StreamExt};
use serde_json::{Map, Value};

use crate::domain::sanitize::sanitize_map;
use crate::domain::validation::{InputSlot, ValidationFailure, validate};
use crate::domain::{Error, Identity, SessionToken};

use super::error::ErrorNormalizer;
use super::guards::{AuthenticationGuard, authorize, extract_credential};

type RawSlot = Result<Map<String, Value>, Error>;

/// Inputs as read off the wire, before any stage has run.
struct RawInput {
    params: Map<String, Value>,
    query: RawSlot,
    body: RawSlot,
}

impl RawInput {
    fn read(endpoint: &Endpoint, req: &HttpRequest, body: Result<Bytes, Error>) -> Self {
        let params = req
            .match_info()
            .iter()
            .map(|(name, value)| (name.to_owned(), Value::String(value.to_owned())))
            .collect();

        let query = Query::<HashMap<String, String>>::from_query(req.query_string())
            .map(|parsed| {
                parsed
                    .into_inner()
                    .into_iter()
                    .map(|(name, value)| (name, Value::String(value)))
                    .collect()
            })
            .map_err(|err| Error::validation(format!("malformed query string: {err}")));

        let body = if endpoint.rules(InputSlot::Body).is_some() {
            body.and_then(|bytes| parse_body(&bytes))
        } else {
            Ok(Map::new())
        };

        Self {
            params,
            query,
            body,
        }
    }

    fn sanitized(self) -> Self {
        Self {
            params: sanitize_map(self.params),
            query: self.query.map(sanitize_map),
            body: self.body.map(sanitize_map),
        }
    }
}

/// Default cap on request bodies read by the pipeline.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

fn body_too_large(limit: usize) -> Error {
    Error::validation(format!("request body exceeds {limit} bytes"))
}

/// Drain `stream` into memory, stopping as soon as `limit` is exceeded.
async fn collect_body<S>(stream: S, limit: usize) -> Result<Bytes, Error>
where
    S: Stream<Item = Result<Bytes, PayloadError>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut buffer = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|err| Error::validation(format!("could not read request body: {err}")))?;
        if buffer.len().saturating_add(chunk.len()) > limit {
            return Err(body_too_large(limit));
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer.freeze())
}

fn parse_body(bytes: &Bytes) -> RawSlot {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::validation("request body must be a JSON object")),
        Err(err) => Err(Error::validation(format!("malformed JSON body: {err}"))),
    }
}

/// Normalised slots after validation.
struct ValidInput {
    params: Map<String, Value>,
    query: Map<String, Value>,
    body: Map<String, Value>,
}

fn validate_inputs(endpoint: &Endpoint, raw: RawInput) -> Result<ValidInput, Error> {
    let RawInput {
        params,
        query,
        body,
    } = raw;
    let declared = |slot: InputSlot, input: RawSlot| match endpoint.rules(slot) {
        Some(_) => input,
        None => Ok(Map::new()),
    };
    let query = declared(InputSlot::Query, query)?;
    let body = declared(InputSlot::Body, body)?;

    // Slots without a rule set reach the handler empty.
    let mut failure = ValidationFailure::default();
    let mut run = |slot: InputSlot, input: Map<String, Value>| match endpoint.rules(slot) {
        None => Map::new(),
        Some(rules) => validate(rules, &input, slot).unwrap_or_else(|slot_failure| {
            failure.merge(slot_failure);
            Map::new()
        }),
    };
    let valid = ValidInput {
        params: run(InputSlot::Params, params),
        query: run(InputSlot::Query, query),
        body: run(InputSlot::Body, body),
    };
    if failure.is_empty() {
        Ok(valid)
    } else {
        Err(failure.into())
    }
}

/// Shared, stateless dispatcher.
#[derive(Clone)]
pub struct Pipeline {
    guard: AuthenticationGuard,
    normalizer: ErrorNormalizer,
    cookie_name: Arc<str>,
    body_limit: usize,
}

impl Pipeline {
    /// Build a pipeline reading session cookies named `cookie_name`.
    pub fn new(
        guard: AuthenticationGuard,
        normalizer: ErrorNormalizer,
        cookie_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            guard,
            normalizer,
            cookie_name: cookie_name.into(),
            body_limit: MAX_BODY_BYTES,
        }
    }

    /// Override the body size cap.
    #[must_use]
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Error normaliser used for every failure.
    pub fn normalizer(&self) -> &ErrorNormalizer {
        &self.normalizer
    }

    /// Run `endpoint` for `req` with an already buffered body and render
    /// exactly one response.
    pub async fn dispatch(&self, endpoint: &Endpoint, req: &HttpRequest, body: Bytes) -> HttpResponse {
        let body = if body.len() > self.body_limit {
            Err(body_too_large(self.body_limit))
        } else {
            Ok(body)
        };
        self.respond(endpoint, req, body).await
    }

    /// Run `endpoint` for `req`, reading the body from `payload` only when
    /// the endpoint declares body rules.
    pub async fn dispatch_payload<S>(
        &self,
        endpoint: &Endpoint,
        req: &HttpRequest,
        payload: S,
    ) -> HttpResponse
    where
        S: Stream<Item = Result<Bytes, PayloadError>>,
    {
        let body = if endpoint.rules(InputSlot::Body).is_some() {
            collect_body(payload, self.body_limit).await
        } else {
            Ok(Bytes::new())
        };
        self.respond(endpoint, req, body).await
    }

    async fn respond(
        &self,
        endpoint: &Endpoint,
        req: &HttpRequest,
        body: Result<Bytes, Error>,
    ) -> HttpResponse {
        match self.run(endpoint, req, body).await {
            Ok(reply) => reply.into_response(),
            Err(error) => self.normalizer.respond(&error),
        }
    }

    async fn run(
        &self,
        endpoint: &Endpoint,
        req: &HttpRequest,
        body: Result<Bytes, Error>,
    ) -> Result<Reply, Error> {
        let raw = RawInput::read(endpoint, req, body);
        let raw = if endpoint.sanitizes() {
            raw.sanitized()
        } else {
            raw
        };

        let credential = extract_credential(req, &self.cookie_name);
        let identity = self.guard_access(endpoint.access(), credential.as_ref()).await?;
        let input = validate_inputs(endpoint, raw)?;

        endpoint
            .handler()
            .handle(ValidatedRequest {
                identity,
                credential,
                params: input.params,
                query: input.query,
                body: input.body,
            })
            .await
    }

    async fn guard_access(
        &self,
        access: Access,
        credential: Option<&SessionToken>,
    ) -> Result<Option<Identity>, Error> {
        match access {
            Access::Public => Ok(None),
            Access::Authenticated => self.guard.authenticate(credential).await.map(Some),
            Access::MinimumRole(role) => {
                let identity = self.guard.authenticate(credential).await?;
                authorize(Some(&identity), role)?;
                Ok(Some(identity))
            }
        }
    }
}
