//! Resolved principals and the opaque credentials that name them.

use std::fmt;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use super::{Role, UserId};

/// Opaque session credential presented by a client.
///
/// The raw value is zeroed on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Wrap a raw token. Returns `None` for blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Raw token text.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Issue and expiry timestamps of the session backing an [`Identity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMetadata {
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionMetadata {
    /// Build session metadata.
    #[must_use]
    pub fn new(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            issued_at,
            expires_at,
        }
    }

    /// When the session was issued.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the session stops being accepted.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Authenticated principal for the current request.
///
/// ## Invariants
/// - Created by the authentication guard for one request and dropped with it.
/// - Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    user_id: UserId,
    role: Role,
    session: SessionMetadata,
}

impl Identity {
    /// Build an identity from a resolved session.
    #[must_use]
    pub fn new(user_id: UserId, role: Role, session: SessionMetadata) -> Self {
        Self {
            user_id,
            role,
            session,
        }
    }

    /// Unique principal identifier.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role granted to the principal.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Session timestamps.
    #[must_use]
    pub fn session(&self) -> &SessionMetadata {
        &self.session
    }

    /// Whether the backing session has lapsed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.session.expires_at
    }
}
