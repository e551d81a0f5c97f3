//! Storefront account identity types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Identifier was empty.
    #[error("user id must not be empty")]
    EmptyId,
    /// Identifier was not a canonical UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`].
    ///
    /// Surrounding whitespace is rejected rather than trimmed so stored and
    /// presented identifiers always compare byte for byte.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account record returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: UserId,
    username: String,
    role: Role,
}

impl Account {
    /// Build an account from validated parts.
    #[must_use]
    pub fn new(id: UserId, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }

    /// Stable account identifier.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Role granted to sessions issued for this account.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }
}
