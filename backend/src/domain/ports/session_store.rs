//! Driven port resolving opaque session tokens to identities.
//!
//! The authentication guard only ever talks to this trait. Whether sessions
//! live in memory, Redis or a database is an adapter concern.

use async_trait::async_trait;

use crate::domain::{Account, Error, Identity, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Failures raised by a session backend.
    pub enum SessionStoreError {
        /// The backend could not be reached or answered with garbage.
        Unavailable { message: String } => "session store unavailable: {message}",
    }
}

impl From<SessionStoreError> for Error {
    fn from(value: SessionStoreError) -> Self {
        match value {
            SessionStoreError::Unavailable { .. } => Error::unexpected(value.to_string()),
        }
    }
}

/// Token and resolved identity returned when a session is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub identity: Identity,
}

/// Port for session lookup and lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up the identity behind `token`.
    ///
    /// Unknown and revoked tokens resolve to `Ok(None)`. Expiry is left to
    /// the caller, which owns the clock.
    async fn resolve(&self, token: &SessionToken) -> Result<Option<Identity>, SessionStoreError>;

    /// Open a new session for an authenticated account.
    async fn issue(&self, account: &Account) -> Result<IssuedSession, SessionStoreError>;

    /// Revoke `token`. Returns whether a live session was removed.
    async fn revoke(&self, token: &SessionToken) -> Result<bool, SessionStoreError>;
}
