//! Credentials submitted to the login endpoint.
//!
//! The login body skips the sanitiser, so this is the last place the raw
//! values are checked before a [`LoginService`](super::ports::LoginService)
//! sees them.

use zeroize::Zeroizing;

/// Rejected login payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Blank once surrounding whitespace is removed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Zero-length password.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Username and password as presented, ready for account lookup.
///
/// The username is trimmed; the password is kept byte for byte and zeroed
/// on drop.
///
/// # Examples
/// ```
/// use storefront::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" staff ", "password")?;
/// assert_eq!(creds.username(), "staff");
/// # Ok::<(), storefront::domain::LoginValidationError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Check and wrap raw login values.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let username = match username.trim() {
            "" => return Err(LoginValidationError::EmptyUsername),
            trimmed => trimmed.to_owned(),
        };
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password exactly as submitted.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
