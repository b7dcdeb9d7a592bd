//! Health check endpoint
//!
//! # Endpoint
//!
//! ```text
//! GET /health
//! ```
//!
//! # Response
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "database": "connected",
//!   "latency_ms": 1,
//!   "pool": { "in_use": 1, "idle": 4, "size": 5, "max_size": 10 }
//! }
//! ```
//!
//! When the database does not answer, the status is `degraded` and the
//! response code is 503.

use crate::app::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use taskmatrix_shared::db::pool::{get_pool_stats, ping, PoolStats};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Round trip of the ping query, absent when it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    pub pool: PoolStats,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let deadline = state.db.timeout();
    let latency_ms = match tokio::time::timeout(deadline, ping(state.db.pool())).await {
        Ok(Ok(latency)) => Some(latency.as_millis() as u64),
        _ => None,
    };

    let (code, status, database) = if latency_ms.is_some() {
        (StatusCode::OK, "healthy", "connected")
    } else {
        tracing::warn!("Health check could not reach the database");
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "disconnected")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
            latency_ms,
            pool: get_pool_stats(state.db.pool()),
        }),
    )
}
