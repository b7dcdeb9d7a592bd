//! Database layer for Task Matrix
//!
//! # Modules
//!
//! - `pool`: PostgreSQL connection pool management with health checks
//! - `migrations`: schema migrations and idempotent lookup seeding
//!
//! The [`Db`] handle pairs the pool with a deadline. Every store
//! operation runs through [`Db::bounded`], so a slow or wedged database turns
//! into [`StoreError::Unavailable`] instead of a hung request.

pub mod migrations;
pub mod pool;

use sqlx::PgPool;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// Default budget for a store call made outside any request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pool handle carrying the deadline for store calls
///
/// Without an explicit deadline each call gets `timeout` of its own. Once
/// [`Db::with_deadline`] pins an instant, every call made through the handle
/// shares it, so consecutive calls draw on one budget.
#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Db {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_TIMEOUT,
            deadline: None,
        }
    }

    /// Per-call budget used when no deadline is pinned
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            pool: self.pool.clone(),
            timeout,
            deadline: self.deadline,
        }
    }

    /// Handle whose calls must all finish by `deadline`
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        Self {
            pool: self.pool.clone(),
            timeout: self.timeout,
            deadline: Some(deadline),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs `op`, failing with `Unavailable` once the deadline passes
    ///
    /// On expiry the future is dropped; an open transaction inside it is rolled
    /// back when its guard drops.
    pub async fn bounded<T, F>(&self, op: &'static str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        let deadline = self
            .deadline
            .unwrap_or_else(|| Instant::now() + self.timeout);

        match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation = op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    pinned = self.deadline.is_some(),
                    "Store call exceeded its deadline"
                );
                Err(StoreError::Unavailable(format!("{} timed out", op)))
            }
        }
    }
}
