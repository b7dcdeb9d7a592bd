//! Identity provider and the in-memory session store
//!
//! The data-access layer only needs `validate(token) -> UserIdentity`. The
//! [`IdentityProvider`] trait is the seam; [`SessionStore`] is the in-process
//! implementation used by the API server.
//!
//! # Bounds
//!
//! - Each session expires `ttl` after issue. Expired tokens are rejected and
//!   removed on the next lookup.
//! - At most `max_entries` sessions are kept. Issuing at capacity first purges
//!   expired sessions, then evicts the oldest live one.
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_shared::auth::session::{IdentityProvider, SessionConfig, SessionStore};
//! use taskmatrix_shared::models::user::UserIdentity;
//!
//! # async fn example(alice: UserIdentity) -> Result<(), Box<dyn std::error::Error>> {
//! let sessions = SessionStore::new(SessionConfig::default());
//! let token = sessions.issue(alice.clone()).await;
//! assert_eq!(sessions.validate(&token).await?, alice);
//! sessions.revoke(&token).await;
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::user::UserIdentity;

/// Maps opaque credentials to user identities
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Issues a new token bound to `identity`
    async fn issue(&self, identity: UserIdentity) -> String;

    /// Resolves a token, failing with [`StoreError::Unauthorized`]
    async fn validate(&self, token: &str) -> StoreResult<UserIdentity>;

    /// Invalidates a token; returns whether it was live
    async fn revoke(&self, token: &str) -> bool;
}

/// Session store bounds
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(86_400),
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct Session {
    identity: UserIdentity,
    issued_at: Instant,
    expires_at: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// TTL- and size-bounded token table
#[derive(Debug)]
pub struct SessionStore {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config: SessionConfig {
                ttl: config.ttl,
                max_entries: config.max_entries.max(1),
            },
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

fn purge(sessions: &mut HashMap<String, Session>, now: Instant) -> usize {
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired(now));
    before - sessions.len()
}

#[async_trait]
impl IdentityProvider for SessionStore {
    async fn issue(&self, identity: UserIdentity) -> String {
        let now = Instant::now();
        let token = Uuid::new_v4().to_string();
        let user_id = identity.id;

        let mut sessions = self.sessions.write().await;

        if sessions.len() >= self.config.max_entries {
            let purged = purge(&mut sessions, now);
            if purged > 0 {
                debug!(purged, "Purged expired sessions at capacity");
            }
        }

        if sessions.len() >= self.config.max_entries {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.issued_at)
                .map(|(t, _)| t.clone());

            if let Some(oldest) = oldest {
                if let Some(evicted) = sessions.remove(&oldest) {
                    debug!(user_id = evicted.identity.id, "Evicted oldest session at capacity");
                }
            }
        }

        sessions.insert(
            token.clone(),
            Session {
                identity,
                issued_at: now,
                expires_at: now + self.config.ttl,
            },
        );

        debug!(user_id, "Issued session");
        token
    }

    async fn validate(&self, token: &str) -> StoreResult<UserIdentity> {
        let now = Instant::now();

        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return Err(StoreError::Unauthorized("invalid token".to_string())),
                Some(session) if !session.is_expired(now) => return Ok(session.identity.clone()),
                Some(_) => {}
            }
        }

        // Expired: prune under the write lock
        self.sessions.write().await.remove(token);
        Err(StoreError::Unauthorized("session expired".to_string()))
    }

    async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}
