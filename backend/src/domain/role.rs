//! Closed role hierarchy used by the authorisation guard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role granted to an authenticated principal.
///
/// Variants are declared lowest privilege first; the derived [`Ord`] is the
/// hierarchy `customer < staff < admin`.
///
/// # Examples
/// ```
/// use storefront::domain::Role;
///
/// assert!(Role::Staff.satisfies(Role::Customer));
/// assert!(!Role::Staff.satisfies(Role::Admin));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Storefront shopper.
    Customer,
    /// Bakery staff managing orders.
    Staff,
    /// Full catalogue and user administration.
    Admin,
}

impl Role {
    /// Whether this role meets a minimum `required` role.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }

    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Staff => "staff",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored role string is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
