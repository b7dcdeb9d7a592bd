//! Bearer token authentication
//!
//! Resolves `Authorization: Bearer <token>` through the configured
//! [`IdentityProvider`](taskmatrix_shared::auth::session::IdentityProvider) and
//! injects an [`AuthUser`] into the request extensions. Handlers behind this
//! layer take `Extension<AuthUser>`.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use taskmatrix_shared::models::user::UserIdentity;

use crate::{app::AppState, error::ApiError};

/// Authenticated caller of the current request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: UserIdentity,

    /// The presented token, kept so logout can revoke it
    pub token: String,
}

impl AuthUser {
    pub fn id(&self) -> i32 {
        self.identity.id
    }
}

/// Extracts the token from an `Authorization` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware layer
///
/// # Errors
///
/// 401 if the header is missing, not a Bearer token, or the token does not
/// resolve to a live session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = bearer_token(header_value)
        .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?
        .to_string();

    let identity = state.identity.validate(&token).await.map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    tracing::Span::current().record("user_id", identity.id);
    req.extensions_mut().insert(AuthUser { identity, token });

    Ok(next.run(req).await)
}
