//! Server configuration assembled from the environment and settings.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use storefront::config::{AppConfig, ServerSettings};
use storefront::domain::ports::FixtureLoginService;
use storefront::inbound::http::HttpDependencies;
use storefront::inbound::http::auth::SessionCookie;
use storefront::inbound::http::error::ErrorExposure;
use storefront::outbound::{InMemoryCatalogue, InMemorySessionStore};

/// Everything `create_server` needs, built once at start-up.
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) cors_origin: String,
    pub(crate) http: HttpDependencies,
}

impl ServerConfig {
    /// Wire adapters from the validated configuration.
    #[must_use]
    pub fn new(app: &AppConfig, settings: &ServerSettings, clock: Arc<dyn Clock>) -> Self {
        let ttl = settings.session_ttl();
        let sessions = Arc::new(InMemorySessionStore::new(
            app.session_secret(),
            ttl,
            Arc::clone(&clock),
        ));
        let catalogue = Arc::new(InMemoryCatalogue::new(Arc::clone(&clock)));
        let exposure = if app.mode().exposes_internals() {
            ErrorExposure::Verbose
        } else {
            ErrorExposure::Redacted
        };
        info!(
            mode = %app.mode(),
            payments = app.payments().is_some(),
            cookie = settings.cookie_name(),
            "storefront configured"
        );

        Self {
            bind_addr: settings.bind_addr(),
            cors_origin: app.cors_origin().to_owned(),
            http: HttpDependencies {
                sessions,
                login: Arc::new(FixtureLoginService),
                categories: catalogue.clone(),
                products: catalogue,
                clock,
                cookie: SessionCookie::new(
                    settings.cookie_name(),
                    settings.cookie_secure(),
                    ttl,
                ),
                exposure,
            },
        }
    }
}
