//! Per-request deadline
//!
//! The deadline is stamped when the request enters the router. Every store
//! call the handler makes is bounded by whatever is left of it (see
//! [`crate::extract::Stores`]), so a handler that issues several queries
//! cannot exceed `REQUEST_TIMEOUT_SECONDS` in total.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::time::Instant;

use crate::app::AppState;

/// Instant by which the current request must finish its store calls
#[derive(Debug, Clone, Copy)]
pub struct RequestDeadline(pub Instant);

impl RequestDeadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }
}

pub async fn stamp_deadline(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    req.extensions_mut()
        .insert(RequestDeadline::after(state.config.request_timeout()));
    next.run(req).await
}
