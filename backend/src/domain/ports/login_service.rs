//! Driving port for login use-cases.
//!
//! Inbound adapters authenticate credentials through this trait without
//! knowing where accounts are stored, so handler tests can substitute a
//! double.

use async_trait::async_trait;

use crate::domain::{Account, Error, LoginCredentials, Role, UserId};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the matching account.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error>;
}

const FIXTURE_PASSWORD: &str = "password";

const FIXTURE_ACCOUNTS: [(&str, &str, Role); 3] = [
    ("customer", "5b0c4a52-4f7c-4d3e-8f7e-0e6f1d1a2b01", Role::Customer),
    ("staff", "5b0c4a52-4f7c-4d3e-8f7e-0e6f1d1a2b02", Role::Staff),
    ("admin", "5b0c4a52-4f7c-4d3e-8f7e-0e6f1d1a2b03", Role::Admin),
];

/// In-memory authenticator with one account per role.
///
/// `customer`, `staff` and `admin` all sign in with `password`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        let found = FIXTURE_ACCOUNTS
            .iter()
            .find(|(username, _, _)| *username == credentials.username())
            .filter(|_| credentials.password() == FIXTURE_PASSWORD);
        let Some((username, id, role)) = found else {
            return Err(Error::unauthenticated("invalid credentials"));
        };
        let id = UserId::new(id)
            .map_err(|err| Error::unexpected(format!("invalid fixture user id: {err}")))?;
        Ok(Account::new(id, *username, *role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("customer", Role::Customer)]
    #[case("staff", Role::Staff)]
    #[case(" admin ", Role::Admin)]
    #[tokio::test]
    async fn fixture_accounts_sign_in_with_their_role(
        #[case] username: &str,
        #[case] role: Role,
    ) {
        let creds = LoginCredentials::try_from_parts(username, "password").expect("shape");
        let account = FixtureLoginService
            .authenticate(&creds)
            .await
            .expect("fixture account");
        assert_eq!(account.role(), role);
        assert_eq!(account.username(), username.trim());
    }

    #[rstest]
    #[case("admin", "wrong")]
    #[case("baker", "password")]
    #[tokio::test]
    async fn bad_credentials_are_unauthenticated(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password).expect("shape");
        let err = FixtureLoginService
            .authenticate(&creds)
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }
}
