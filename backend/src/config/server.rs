//! Listener and session cookie settings loaded via OrthoConfig.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Session cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "storefront_session";
/// Session lifetime used when none is configured.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Tunables for the HTTP listener and session cookie.
///
/// Every value reads from a `STOREFRONT_` environment variable or the
/// matching CLI flag.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Name of the session cookie.
    pub cookie_name: Option<String>,
    /// Send the session cookie only over HTTPS. Defaults to on.
    pub cookie_secure: Option<bool>,
    /// Session lifetime in minutes.
    pub session_ttl_minutes: Option<i64>,
}

impl ServerSettings {
    /// Address to bind, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> (String, u16) {
        (
            self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Session cookie name.
    pub fn cookie_name(&self) -> &str {
        self.cookie_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COOKIE_NAME)
    }

    /// Whether the session cookie carries the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Session lifetime. Non-positive values fall back to the default.
    pub fn session_ttl(&self) -> chrono::Duration {
        let minutes = self
            .session_ttl_minutes
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_MINUTES);
        chrono::Duration::minutes(minutes)
    }

    /// Parsed socket address, when the host is a literal IP.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        let (host, port) = self.bind_addr();
        format!("{host}:{port}").parse().ok()
    }
}
