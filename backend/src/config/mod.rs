//! Start-up configuration.
//!
//! [`AppConfig`] holds the deployment secrets and origins read once from the
//! process environment; any missing required value is fatal. Listener and
//! cookie tuning lives in [`ServerSettings`], loaded through `ortho_config`.
//!
//! The environment is read through [`mockable::Env`] so tests can inject
//! values without touching the real process environment.

mod server;

pub use server::{DEFAULT_COOKIE_NAME, DEFAULT_SESSION_TTL_MINUTES, ServerSettings};

use std::fmt;
use std::str::FromStr;

use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

pub const CORS_ORIGIN_ENV: &str = "CORS_ORIGIN";
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const SQUARE_ACCESS_TOKEN_ENV: &str = "SQUARE_ACCESS_TOKEN";
pub const SQUARE_LOCATION_ID_ENV: &str = "SQUARE_LOCATION_ID";
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Minimum accepted session secret length in bytes.
pub const SESSION_SECRET_MIN_LEN: usize = 32;

const APP_ENV_EXPECTED: &str = "development|production";
const ORIGIN_EXPECTED: &str = "an http:// or https:// origin";

/// Deployment mode selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeMode {
    /// Verbose errors for local work.
    Development,
    /// Redacted errors. Used when `APP_ENV` is unset.
    #[default]
    Production,
}

impl RuntimeMode {
    /// Whether internal error messages may reach clients.
    #[must_use]
    pub fn exposes_internals(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

impl FromStr for RuntimeMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

/// Errors raised while reading [`AppConfig`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// The session secret is too short to pepper token fingerprints.
    #[error("{SESSION_SECRET_ENV} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort { length: usize, min_len: usize },
}

/// Payment provider credentials. Both values or neither.
pub struct PaymentSettings {
    access_token: Zeroizing<String>,
    location_id: String,
}

impl PaymentSettings {
    /// Provider access token.
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Provider location identifier.
    pub fn location_id(&self) -> &str {
        &self.location_id
    }
}

impl fmt::Debug for PaymentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentSettings")
            .field("access_token", &"<redacted>")
            .field("location_id", &self.location_id)
            .finish()
    }
}

/// Environment configuration read once at start-up and passed by reference.
pub struct AppConfig {
    mode: RuntimeMode,
    cors_origin: String,
    session_secret: Zeroizing<String>,
    database_url: Zeroizing<String>,
    payments: Option<PaymentSettings>,
}

impl AppConfig {
    /// Runtime mode.
    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Single origin allowed by CORS.
    pub fn cors_origin(&self) -> &str {
        &self.cors_origin
    }

    /// Secret peppering session token fingerprints.
    pub fn session_secret(&self) -> &[u8] {
        self.session_secret.as_bytes()
    }

    /// Connection string for the catalogue database.
    pub fn database_url(&self) -> &str {
        self.database_url.as_str()
    }

    /// Payment credentials, when both are configured.
    pub fn payments(&self) -> Option<&PaymentSettings> {
        self.payments.as_ref()
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("mode", &self.mode)
            .field("cors_origin", &self.cors_origin)
            .field("session_secret", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("payments", &self.payments)
            .finish()
    }
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required<E: Env>(env: &E, name: &'static str) -> Result<String, ConfigError> {
    non_blank(env, name).ok_or(ConfigError::MissingEnv { name })
}

/// Read [`AppConfig`] from `env`.
///
/// `CORS_ORIGIN`, `SESSION_SECRET` and `DATABASE_URL` are required. The
/// payment variables are optional: the storefront runs without card
/// payments and only logs a warning.
///
/// # Examples
/// ```
/// use mockable::MockEnv;
/// use storefront::config::{RuntimeMode, app_config_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "CORS_ORIGIN" => Some("https://shop.example".into()),
///     "SESSION_SECRET" => Some("s".repeat(32)),
///     "DATABASE_URL" => Some("postgres://localhost/bakery".into()),
///     _ => None,
/// });
/// let config = app_config_from_env(&env).expect("valid config");
/// assert_eq!(config.mode(), RuntimeMode::Production);
/// assert!(config.payments().is_none());
/// ```
pub fn app_config_from_env<E: Env>(env: &E) -> Result<AppConfig, ConfigError> {
    let cors_origin = required(env, CORS_ORIGIN_ENV)?;
    if !(cors_origin.starts_with("http://") || cors_origin.starts_with("https://")) {
        return Err(ConfigError::InvalidEnv {
            name: CORS_ORIGIN_ENV,
            value: cors_origin,
            expected: ORIGIN_EXPECTED,
        });
    }

    let session_secret = Zeroizing::new(required(env, SESSION_SECRET_ENV)?);
    if session_secret.len() < SESSION_SECRET_MIN_LEN {
        return Err(ConfigError::SecretTooShort {
            length: session_secret.len(),
            min_len: SESSION_SECRET_MIN_LEN,
        });
    }

    let database_url = Zeroizing::new(required(env, DATABASE_URL_ENV)?);
    let mode = mode_from_env(env)?;
    let payments = payments_from_env(env);

    Ok(AppConfig {
        mode,
        cors_origin,
        session_secret,
        database_url,
        payments,
    })
}

fn mode_from_env<E: Env>(env: &E) -> Result<RuntimeMode, ConfigError> {
    match non_blank(env, APP_ENV_ENV) {
        None => {
            warn!("{APP_ENV_ENV} not set; defaulting to production");
            Ok(RuntimeMode::Production)
        }
        Some(value) => value.parse().map_err(|()| ConfigError::InvalidEnv {
            name: APP_ENV_ENV,
            value,
            expected: APP_ENV_EXPECTED,
        }),
    }
}

fn payments_from_env<E: Env>(env: &E) -> Option<PaymentSettings> {
    let token = non_blank(env, SQUARE_ACCESS_TOKEN_ENV);
    let location = non_blank(env, SQUARE_LOCATION_ID_ENV);
    match (token, location) {
        (Some(token), Some(location_id)) => Some(PaymentSettings {
            access_token: Zeroizing::new(token),
            location_id,
        }),
        (token, location) => {
            let missing: Vec<&str> = [
                (token.is_none(), SQUARE_ACCESS_TOKEN_ENV),
                (location.is_none(), SQUARE_LOCATION_ID_ENV),
            ]
            .into_iter()
            .filter_map(|(absent, name)| absent.then_some(name))
            .collect();
            warn!(
                missing = %missing.join(", "),
                "payment settings incomplete; card payments disabled"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests;
