//! In-memory [`SessionStore`] adapter.
//!
//! Sessions are keyed by `sha256(secret || token)` rendered as hex, so the
//! map never holds a raw bearer credential. Expired entries are pruned
//! lazily whenever a new session is issued.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{IssuedSession, SessionStore, SessionStoreError};
use crate::domain::{Account, Identity, SessionMetadata, SessionToken};

const TOKEN_BYTES: usize = 32;

/// Process-local session table.
pub struct InMemorySessionStore {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    sessions: RwLock<HashMap<String, Identity>>,
}

impl InMemorySessionStore {
    /// Create a store peppering fingerprints with `secret`.
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_vec()),
            ttl,
            clock,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn fingerprint(&self, token: &SessionToken) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_slice());
        hasher.update(token.expose().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn poisoned() -> SessionStoreError {
        SessionStoreError::unavailable("session table lock poisoned")
    }

    /// Number of sessions currently held, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.read().map(|sessions| sessions.len()).unwrap_or(0)
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn resolve(&self, token: &SessionToken) -> Result<Option<Identity>, SessionStoreError> {
        let key = self.fingerprint(token);
        let sessions = self.sessions.read().map_err(|_| Self::poisoned())?;
        Ok(sessions.get(&key).cloned())
    }

    async fn issue(&self, account: &Account) -> Result<IssuedSession, SessionStoreError> {
        let mut raw = Zeroizing::new([0_u8; TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(raw.as_mut());
        let token = SessionToken::new(hex::encode(raw.as_ref()))
            .ok_or_else(|| SessionStoreError::unavailable("generated an empty token"))?;

        let now = self.clock.utc();
        let identity = Identity::new(
            account.id().clone(),
            account.role(),
            SessionMetadata::new(now, now + self.ttl),
        );

        let key = self.fingerprint(&token);
        let mut sessions = self.sessions.write().map_err(|_| Self::poisoned())?;
        let before = sessions.len();
        sessions.retain(|_, existing| !existing.is_expired_at(now));
        if sessions.len() < before {
            debug!(pruned = before - sessions.len(), "dropped expired sessions");
        }
        sessions.insert(key, identity.clone());
        Ok(IssuedSession { token, identity })
    }

    async fn revoke(&self, token: &SessionToken) -> Result<bool, SessionStoreError> {
        let key = self.fingerprint(token);
        let mut sessions = self.sessions.write().map_err(|_| Self::poisoned())?;
        Ok(sessions.remove(&key).is_some())
    }
}
