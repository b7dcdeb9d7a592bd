//! Authentication endpoints
//!
//! # Endpoints
//!
//! - `POST /auth/signup` - Create an account and start a session
//! - `POST /auth/login` - Start a session
//! - `GET /auth/validate` - Return the caller's identity
//! - `POST /auth/logout` - Revoke the presented token
//!
//! Passwords are never stored. The keyed digest from
//! [`SecretDigester`](taskmatrix_shared::auth::digest::SecretDigester) is what
//! the user directory compares.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Stores, ValidatedJson},
    middleware::auth::AuthUser,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskmatrix_shared::{
    error::StoreError,
    models::user::{NewUser, UserIdentity},
};
use validator::Validate;

use super::non_blank;

/// Signup request
///
/// Missing fields deserialize as empty and are reported by validation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[validate(
        custom(function = "non_blank"),
        length(max = 100, message = "Name must be at most 100 characters")
    )]
    pub name: String,

    #[validate(
        custom(function = "non_blank"),
        length(max = 50, message = "Username must be at most 50 characters")
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub avatar_url: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// Login request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom(function = "non_blank"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session token and the user it belongs to
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserIdentity,
}

/// Creates an account and starts a session
///
/// # Request
///
/// ```text
/// POST /auth/signup
/// Content-Type: application/json
///
/// {
///   "name": "Alice",
///   "username": "alice",
///   "email": "alice@example.com",
///   "avatar_url": "",
///   "password": "correct horse",
///   "confirm_password": "correct horse"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "token": "...", "user": { ... } }`
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON
/// - `409 Conflict`: Username or email already taken
/// - `422 Unprocessable Entity`: Validation failed, including mismatched passwords
pub async fn signup(
    State(state): State<AppState>,
    stores: Stores,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let new_user = NewUser {
        name: req.name.trim().to_string(),
        username: req.username.trim().to_string(),
        email: req.email.trim().to_string(),
        avatar_url: req.avatar_url,
        password_digest: state.digester.digest(&req.password),
    };

    let id = stores.users.create_user(new_user.clone()).await?;
    let user = UserIdentity {
        id,
        name: new_user.name,
        username: new_user.username,
        email: new_user.email,
        avatar_url: new_user.avatar_url,
    };

    let token = state.identity.issue(user.clone()).await;
    tracing::info!(user_id = id, username = %user.username, "User signed up");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// Starts a session for an existing user
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    stores: Stores,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let digest = state.digester.digest(&req.password);

    let user = match stores
        .users
        .find_user_by_credentials(req.username.trim(), &digest)
        .await
    {
        Ok(user) => UserIdentity::from(user),
        Err(StoreError::NotFound { .. }) => {
            tracing::warn!(username = %req.username, "Failed login attempt");
            return Err(ApiError::Unauthorized(
                "Invalid username or password".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let token = state.identity.issue(user.clone()).await;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse { token, user }))
}

/// Returns the identity bound to the presented token
pub async fn validate(Extension(auth): Extension<AuthUser>) -> Json<UserIdentity> {
    Json(auth.identity)
}

/// Revokes the presented token
///
/// # Response
///
/// `204 No Content`; the token is rejected from then on.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> StatusCode {
    state.identity.revoke(&auth.token).await;
    tracing::info!(user_id = auth.id(), "User logged out");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request() -> SignupRequest {
        SignupRequest {
            name: "Alice".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar_url: String::new(),
            password: "correct horse".to_string(),
            confirm_password: "correct horse".to_string(),
        }
    }

    #[test]
    fn test_valid_signup() {
        assert!(signup_request().validate().is_ok());
    }

    #[test]
    fn test_password_mismatch_is_reported_on_confirm_field() {
        let req = SignupRequest {
            confirm_password: "battery staple".to_string(),
            ..signup_request()
        };

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("confirm_password"));
    }

    #[test]
    fn test_missing_fields_default_then_fail_validation() {
        let req: SignupRequest = serde_json::from_str(r#"{"username": "alice"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("username"));
    }

    #[test]
    fn test_blank_login_username() {
        let req = LoginRequest {
            username: "   ".to_string(),
            password: "x".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
