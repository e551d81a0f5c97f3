//! Declarative endpoint descriptions consumed by the dispatcher.

use std::future::Future;
use std::sync::Arc;

use actix_web::http::Method;
use async_trait::async_trait;

use crate::domain::validation::{InputSlot, RuleSet};
use crate::domain::{Error, Role};

use super::request::{Reply, ValidatedRequest};

/// Guard configuration for an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No guards run.
    Public,
    /// A valid session is required; any role is accepted.
    Authenticated,
    /// A valid session holding at least this role is required.
    MinimumRole(Role),
}

/// Business logic invoked once every guard and validator has passed.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle a fully validated request.
    async fn handle(&self, request: ValidatedRequest) -> Result<Reply, Error>;
}

/// [`Handler`] backed by an async closure.
pub struct FnHandler<F>(F);

/// Wrap an async closure as a [`Handler`].
///
/// # Examples
/// ```
/// use storefront::inbound::http::pipeline::{Endpoint, Reply, handler_fn};
///
/// let ping = Endpoint::get("/ping", handler_fn(|_request| async { Reply::ok("pong") }));
/// assert_eq!(ping.path(), "/ping");
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(ValidatedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> Handler for FnHandler<F>
where
    F: Fn(ValidatedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, Error>> + Send + 'static,
{
    async fn handle(&self, request: ValidatedRequest) -> Result<Reply, Error> {
        (self.0)(request).await
    }
}

/// One declared method and path plus its pipeline stages.
///
/// Endpoints are public and sanitised unless configured otherwise. A slot
/// without a rule set reaches the handler empty; the body is only read when
/// a body rule set is declared.
#[derive(Clone)]
pub struct Endpoint {
    method: Method,
    path: String,
    access: Access,
    sanitize: bool,
    params: Option<RuleSet>,
    query: Option<RuleSet>,
    body: Option<RuleSet>,
    handler: Arc<dyn Handler>,
}

impl Endpoint {
    /// Declare an endpoint.
    pub fn new(method: Method, path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self {
            method,
            path: path.into(),
            access: Access::Public,
            sanitize: true,
            params: None,
            query: None,
            body: None,
            handler: Arc::new(handler),
        }
    }

    /// Declare a `GET` endpoint.
    pub fn get(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::GET, path, handler)
    }

    /// Declare a `POST` endpoint.
    pub fn post(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::POST, path, handler)
    }

    /// Declare a `PUT` endpoint.
    pub fn put(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    /// Declare a `DELETE` endpoint.
    pub fn delete(path: impl Into<String>, handler: impl Handler + 'static) -> Self {
        Self::new(Method::DELETE, path, handler)
    }

    /// Require a valid session.
    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.access = Access::Authenticated;
        self
    }

    /// Require a valid session with at least `role`.
    #[must_use]
    pub fn min_role(mut self, role: Role) -> Self {
        self.access = Access::MinimumRole(role);
        self
    }

    /// Validate path parameters against `rules`.
    #[must_use]
    pub fn params(mut self, rules: RuleSet) -> Self {
        self.params = Some(rules);
        self
    }

    /// Validate the query string against `rules`.
    #[must_use]
    pub fn query(mut self, rules: RuleSet) -> Self {
        self.query = Some(rules);
        self
    }

    /// Read and validate a JSON object body against `rules`.
    #[must_use]
    pub fn body(mut self, rules: RuleSet) -> Self {
        self.body = Some(rules);
        self
    }

    /// Skip the sanitiser, e.g. for passwords that must reach the handler
    /// byte for byte.
    #[must_use]
    pub fn without_sanitizer(mut self) -> Self {
        self.sanitize = false;
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Route pattern, e.g. `/api/v1/categories/{id}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Guard configuration.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Whether string inputs are sanitised.
    pub fn sanitizes(&self) -> bool {
        self.sanitize
    }

    /// Rule set declared for `slot`.
    pub fn rules(&self, slot: InputSlot) -> Option<&RuleSet> {
        match slot {
            InputSlot::Body => self.body.as_ref(),
            InputSlot::Query => self.query.as_ref(),
            InputSlot::Params => self.params.as_ref(),
        }
    }

    pub(super) fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("access", &self.access)
            .field("sanitize", &self.sanitize)
            .finish_non_exhaustive()
    }
}
