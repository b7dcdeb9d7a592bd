//! Router tests that never reach the database
//!
//! Authentication, validation, rate limiting and the response middleware are
//! all decided before a store call, so these run without PostgreSQL.

mod common;

use axum::http::{Method, StatusCode};
use common::{lazy_app, send, signup_body};
use serde_json::json;
use taskmatrix_shared::models::user::UserIdentity;

fn alice() -> UserIdentity {
    UserIdentity {
        id: 1,
        name: "Alice".to_string(),
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        avatar_url: String::new(),
    }
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let t = lazy_app(&[]);

    let response = send(&t.app, Method::GET, "/projects", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "unauthorized");
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let t = lazy_app(&[]);

    let response = send(&t.app, Method::GET, "/auth/validate", Some("forged"), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_validate_then_logout() {
    let t = lazy_app(&[]);
    let token = t.state.identity.issue(alice()).await;

    let response = send(&t.app, Method::GET, "/auth/validate", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["username"], "alice");

    let response = send(&t.app, Method::POST, "/auth/logout", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = send(&t.app, Method::GET, "/auth/validate", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_password_mismatch_is_422() {
    let t = lazy_app(&[]);
    let mut body = signup_body("alice");
    body["confirm_password"] = json!("something else");

    let response = send(&t.app, Method::POST, "/auth/signup", None, Some(body)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "validation_error");
    assert_eq!(response.body["details"][0]["field"], "confirm_password");
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let t = lazy_app(&[]);
    let token = t.state.identity.issue(alice()).await;

    let response = send(
        &t.app,
        Method::POST,
        "/projects",
        Some(&token),
        Some(json!({ "name": "Website", "due_date": "not a date" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "bad_request");
}

#[tokio::test]
async fn test_project_without_due_date_is_422() {
    let t = lazy_app(&[]);
    let token = t.state.identity.issue(alice()).await;

    let response = send(
        &t.app,
        Method::POST,
        "/projects",
        Some(&token),
        Some(json!({ "name": "Website" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["details"][0]["field"], "due_date");
}

#[tokio::test]
async fn test_unreachable_database_is_503() {
    let t = lazy_app(&[("REQUEST_TIMEOUT_SECONDS", "1")]);
    let token = t.state.identity.issue(alice()).await;

    let response = send(&t.app, Method::GET, "/statuses", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "service_unavailable");

    let response = send(&t.app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["database"], "disconnected");
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let t = lazy_app(&[("RATE_LIMIT_PER_MINUTE", "2")]);

    for remaining in ["1", "0"] {
        let response = send(&t.app, Method::GET, "/projects", None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers["x-ratelimit-limit"], "2");
        assert_eq!(response.headers["x-ratelimit-remaining"], remaining);
    }

    let response = send(&t.app, Method::GET, "/projects", None, None).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers.contains_key("retry-after"));
    assert_eq!(response.body["error"], "rate_limit_exceeded");
}

#[tokio::test]
async fn test_response_middleware_headers() {
    let t = lazy_app(&[]);

    let response = send(&t.app, Method::GET, "/projects", None, None).await;
    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert_eq!(response.headers["x-frame-options"], "DENY");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let t = lazy_app(&[]);

    let response = send(&t.app, Method::GET, "/nowhere", None, None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
