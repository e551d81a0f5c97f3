//! Session endpoints.
//!
//! ```text
//! POST /api/v1/auth/login  {"username":"admin","password":"password"}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```
//!
//! Login bodies skip the sanitiser so passwords reach the authenticator
//! byte for byte.

use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{LoginService, SessionStore};
use crate::domain::{Error, Identity, LoginCredentials, LoginValidationError, Role, SessionToken};

use super::pipeline::{Endpoint, Reply, ValidatedRequest, handler_fn};
use super::rules;

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const LOGOUT_PATH: &str = "/api/v1/auth/logout";
pub const ME_PATH: &str = "/api/v1/auth/me";

/// Session cookie attributes.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: Arc<str>,
    secure: bool,
    ttl: chrono::Duration,
}

impl SessionCookie {
    /// Describe the cookie carrying session tokens.
    pub fn new(name: impl Into<Arc<str>>, secure: bool, ttl: chrono::Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            ttl,
        }
    }

    /// Cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn base(&self, value: String) -> Cookie<'static> {
        Cookie::build(self.name.to_string(), value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish()
    }

    /// Cookie handing `token` to the browser.
    pub fn issue(&self, token: &SessionToken) -> Cookie<'static> {
        let mut cookie = self.base(token.expose().to_owned());
        cookie.set_max_age(CookieDuration::seconds(self.ttl.num_seconds()));
        cookie
    }

    /// Expired cookie clearing any stored token.
    pub fn removal(&self) -> Cookie<'static> {
        let mut cookie = self.base(String::new());
        cookie.make_removal();
        cookie
    }
}

/// Login request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "password")]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Caller identity as returned by `me` and `login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentityView {
    pub user_id: Uuid,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityView {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: *identity.user_id().as_uuid(),
            role: identity.role(),
            issued_at: identity.session().issued_at(),
            expires_at: identity.session().expires_at(),
        }
    }
}

/// Login success payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub identity: IdentityView,
}

/// Collaborators behind the session endpoints.
#[derive(Clone)]
pub struct AuthServices {
    pub login: Arc<dyn LoginService>,
    pub sessions: Arc<dyn SessionStore>,
    pub cookie: SessionCookie,
}

/// Exchange credentials for a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = crate::inbound::http::envelope::SuccessEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid body", body = crate::inbound::http::envelope::ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
pub async fn login(services: AuthServices, request: ValidatedRequest) -> Result<Reply, Error> {
    let payload: LoginRequest = request.body_as()?;
    let credentials = LoginCredentials::try_from(payload)
        .map_err(|err| Error::validation(err.to_string()))?;
    let account = services.login.authenticate(&credentials).await?;
    let issued = services.sessions.issue(&account).await?;
    info!(user_id = %account.id().as_uuid(), role = %account.role(), "session opened");

    let cookie = services.cookie.issue(&issued.token);
    let body = LoginResponse {
        token: issued.token.expose().to_owned(),
        identity: IdentityView::from(&issued.identity),
    };
    Ok(Reply::ok(body)?.cookie(cookie).message("signed in"))
}

/// Revoke the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 401, description = "No session", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
pub async fn logout(services: AuthServices, request: ValidatedRequest) -> Result<Reply, Error> {
    let identity = request.require_identity()?;
    if let Some(token) = request.credential() {
        services.sessions.revoke(token).await?;
    }
    info!(user_id = %identity.user_id().as_uuid(), "session revoked");
    Ok(Reply::ok(serde_json::Value::Null)?
        .cookie(services.cookie.removal())
        .message("signed out"))
}

/// Describe the caller.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current identity", body = crate::inbound::http::envelope::SuccessEnvelope),
        (status = 401, description = "No session", body = crate::inbound::http::envelope::ErrorEnvelope),
    ),
    tags = ["auth"],
    operation_id = "me"
)]
pub async fn me(request: ValidatedRequest) -> Result<Reply, Error> {
    Reply::ok(IdentityView::from(request.require_identity()?))
}

/// Declare the session endpoints.
pub fn endpoints(services: &AuthServices) -> Vec<Endpoint> {
    let login_services = services.clone();
    let logout_services = services.clone();
    vec![
        Endpoint::post(
            LOGIN_PATH,
            handler_fn(move |request| login(login_services.clone(), request)),
        )
        .without_sanitizer()
        .body(rules::login_body()),
        Endpoint::post(
            LOGOUT_PATH,
            handler_fn(move |request| logout(logout_services.clone(), request)),
        )
        .authenticated(),
        Endpoint::get(ME_PATH, handler_fn(me)).authenticated(),
    ]
}
