//! HTTP inbound adapter.
//!
//! Business endpoints are declared as [`pipeline::Endpoint`] values and run
//! through the shared [`pipeline::Pipeline`]; [`router::Router`] mounts them.
//! Only the health probes bypass the pipeline.

pub mod auth;
pub mod catalogue;
pub mod envelope;
pub mod error;
pub mod guards;
pub mod health;
pub mod pipeline;
pub mod router;
pub mod rules;

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{LoginService, SessionStore};

use self::auth::{AuthServices, SessionCookie};
use self::catalogue::{Categories, Products};
use self::error::{ErrorExposure, ErrorNormalizer};
use self::guards::AuthenticationGuard;
use self::pipeline::Pipeline;
use self::router::Router;

/// Collaborators needed to serve the storefront API.
#[derive(Clone)]
pub struct HttpDependencies {
    pub sessions: Arc<dyn SessionStore>,
    pub login: Arc<dyn LoginService>,
    pub categories: Categories,
    pub products: Products,
    pub clock: Arc<dyn Clock>,
    pub cookie: SessionCookie,
    pub exposure: ErrorExposure,
}

/// Declare every storefront endpoint over `deps`.
pub fn storefront_router(deps: &HttpDependencies) -> Router {
    let guard = AuthenticationGuard::new(Arc::clone(&deps.sessions), Arc::clone(&deps.clock));
    let pipeline = Pipeline::new(
        guard,
        ErrorNormalizer::new(deps.exposure),
        deps.cookie.name(),
    );
    let auth = AuthServices {
        login: Arc::clone(&deps.login),
        sessions: Arc::clone(&deps.sessions),
        cookie: deps.cookie.clone(),
    };
    Router::new(pipeline)
        .endpoints(auth::endpoints(&auth))
        .endpoints(catalogue::endpoints(&deps.categories, &deps.products))
}
