//! Authentication and authorisation guards.
//!
//! Every authentication failure carries [`UNAUTHENTICATED_MESSAGE`] so
//! clients cannot tell a missing token from an expired one. The concrete
//! reason is only logged at `debug`.

use std::sync::Arc;

use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::SessionStore;
use crate::domain::{Error, Identity, Role, SessionToken};

/// Message for every authentication failure.
pub const UNAUTHENTICATED_MESSAGE: &str = "authentication required";
/// Message for every role failure.
pub const FORBIDDEN_MESSAGE: &str = "insufficient permissions";

const BEARER_SCHEME: &str = "bearer";

/// Read the session credential from the cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn extract_credential(req: &HttpRequest, cookie_name: &str) -> Option<SessionToken> {
    if let Some(token) = req
        .cookie(cookie_name)
        .and_then(|cookie| SessionToken::new(cookie.value()))
    {
        return Some(token);
    }
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    SessionToken::new(token)
}

/// Resolves credentials to identities through the session store.
#[derive(Clone)]
pub struct AuthenticationGuard {
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl AuthenticationGuard {
    /// Build a guard over `sessions`, judging expiry against `clock`.
    pub fn new(sessions: Arc<dyn SessionStore>, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, clock }
    }

    /// Resolve `credential` to an identity.
    ///
    /// A store outage is not an authentication failure; it surfaces as an
    /// unexpected error.
    pub async fn authenticate(&self, credential: Option<&SessionToken>) -> Result<Identity, Error> {
        let Some(token) = credential else {
            debug!(reason = "missing", "authentication rejected");
            return Err(Error::unauthenticated(UNAUTHENTICATED_MESSAGE));
        };
        let Some(identity) = self.sessions.resolve(token).await? else {
            debug!(reason = "unknown", "authentication rejected");
            return Err(Error::unauthenticated(UNAUTHENTICATED_MESSAGE));
        };
        if identity.is_expired_at(self.clock.utc()) {
            debug!(reason = "expired", user_id = %identity.user_id(), "authentication rejected");
            return Err(Error::unauthenticated(UNAUTHENTICATED_MESSAGE));
        }
        Ok(identity)
    }
}

/// Check that `identity` holds at least `required`.
///
/// # Examples
/// ```
/// use storefront::domain::{ErrorCode, Role};
/// use storefront::inbound::http::guards::authorize;
///
/// let err = authorize(None, Role::Customer).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Unauthenticated);
/// ```
pub fn authorize(identity: Option<&Identity>, required: Role) -> Result<(), Error> {
    let Some(identity) = identity else {
        return Err(Error::unauthenticated(UNAUTHENTICATED_MESSAGE));
    };
    if identity.role().satisfies(required) {
        Ok(())
    } else {
        debug!(
            user_id = %identity.user_id(),
            role = %identity.role(),
            required = %required,
            "authorisation rejected"
        );
        Err(Error::forbidden(FORBIDDEN_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockSessionStore, SessionStoreError};
    use crate::domain::{ErrorCode, SessionMetadata, UserId};
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use chrono::{DateTime, Duration, Local, TimeZone, Utc};
    use rstest::{fixture, rstest};
    use rstest_bdd_macros::{given, then, when};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.0.with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 12, 0, 0)
            .single()
            .expect("valid instant")
    }

    fn identity(role: Role, expires_at: DateTime<Utc>) -> Identity {
        let id = UserId::new("5b0c4a52-4f7c-4d3e-8f7e-0e6f1d1a2b01").expect("fixture id");
        Identity::new(
            id,
            role,
            SessionMetadata::new(expires_at - Duration::hours(1), expires_at),
        )
    }

    fn guard(store: MockSessionStore, now: DateTime<Utc>) -> AuthenticationGuard {
        AuthenticationGuard::new(Arc::new(store), Arc::new(FixedClock(now)))
    }

    fn token(raw: &str) -> SessionToken {
        SessionToken::new(raw).expect("token")
    }

    #[rstest]
    #[case(TestRequest::default().cookie(Cookie::new("sid", "from-cookie")), Some("from-cookie"))]
    #[case(TestRequest::default().insert_header((AUTHORIZATION, "Bearer abc")), Some("abc"))]
    #[case(TestRequest::default().insert_header((AUTHORIZATION, "bearer  abc ")), Some("abc"))]
    #[case(TestRequest::default().insert_header((AUTHORIZATION, "Basic abc")), None)]
    #[case(TestRequest::default().insert_header((AUTHORIZATION, "Bearer")), None)]
    #[case(TestRequest::default().cookie(Cookie::new("other", "x")), None)]
    #[case(
        TestRequest::default()
            .cookie(Cookie::new("sid", "cookie-wins"))
            .insert_header((AUTHORIZATION, "Bearer header")),
        Some("cookie-wins")
    )]
    fn credentials_come_from_cookie_or_bearer_header(
        #[case] request: TestRequest,
        #[case] expected: Option<&str>,
    ) {
        let req = request.to_http_request();
        let token = extract_credential(&req, "sid");
        assert_eq!(token.as_ref().map(SessionToken::expose), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn live_sessions_resolve(now: DateTime<Utc>) {
        let expected = identity(Role::Staff, now + Duration::minutes(5));
        let returned = expected.clone();
        let mut store = MockSessionStore::new();
        store
            .expect_resolve()
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));
        let resolved = guard(store, now)
            .authenticate(Some(&token("live")))
            .await
            .expect("authenticated");
        assert_eq!(resolved, expected);
    }

    #[rstest]
    #[case::unknown(None)]
    #[case::expired_now(Some(Duration::zero()))]
    #[case::expired_earlier(Some(Duration::minutes(-1)))]
    #[tokio::test]
    async fn unknown_and_expired_tokens_share_one_message(
        now: DateTime<Utc>,
        #[case] expires_in: Option<Duration>,
    ) {
        let found = expires_in.map(|delta| identity(Role::Admin, now + delta));
        let mut store = MockSessionStore::new();
        store
            .expect_resolve()
            .returning(move |_| Ok(found.clone()));
        let err = guard(store, now)
            .authenticate(Some(&token("stale")))
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
        assert_eq!(err.message(), UNAUTHENTICATED_MESSAGE);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_credentials_skip_the_store(now: DateTime<Utc>) {
        let mut store = MockSessionStore::new();
        store.expect_resolve().never();
        let err = guard(store, now)
            .authenticate(None)
            .await
            .expect_err("rejected");
        assert_eq!(err.message(), UNAUTHENTICATED_MESSAGE);
    }

    #[rstest]
    #[tokio::test]
    async fn store_outages_are_unexpected(now: DateTime<Utc>) {
        let mut store = MockSessionStore::new();
        store
            .expect_resolve()
            .returning(|_| Err(SessionStoreError::unavailable("redis down")));
        let err = guard(store, now)
            .authenticate(Some(&token("any")))
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::Unexpected);
    }

    #[given("a staff identity")]
    fn a_staff_identity() -> Identity {
        identity(Role::Staff, now() + Duration::hours(1))
    }

    #[when("the role guard runs")]
    fn the_guard_requires(identity: &Identity, role: Role) -> Result<(), Error> {
        authorize(Some(identity), role)
    }

    #[then("access is granted")]
    fn access_is_granted(result: Result<(), Error>) {
        assert!(result.is_ok(), "expected access, got {result:?}");
    }

    #[then("access is forbidden")]
    fn access_is_forbidden(result: Result<(), Error>) {
        let err = result.expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), FORBIDDEN_MESSAGE);
    }

    #[rstest]
    fn staff_satisfies_customer_routes() {
        let identity = a_staff_identity();
        access_is_granted(the_guard_requires(&identity, Role::Customer));
        access_is_granted(the_guard_requires(&identity, Role::Staff));
    }

    #[rstest]
    fn staff_is_forbidden_from_admin_routes() {
        let identity = a_staff_identity();
        access_is_forbidden(the_guard_requires(&identity, Role::Admin));
    }

    #[rstest]
    fn anonymous_requests_are_unauthenticated_not_forbidden() {
        let err = authorize(None, Role::Admin).expect_err("anonymous");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }
}
