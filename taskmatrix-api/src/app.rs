//! Application state and router builder
//!
//! This module defines the shared application state and provides
//! a function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_api::{app::AppState, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let state = AppState::new(pool, config)?;
//! let app = taskmatrix_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    middleware::{
        auth::require_auth, deadline::stamp_deadline, rate_limit::rate_limit_layer,
        rate_limit::RateLimiter, security::SecurityHeadersLayer,
    },
    routes,
};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use taskmatrix_shared::auth::{
    digest::SecretDigester,
    session::{IdentityProvider, SessionStore},
};
use taskmatrix_shared::db::Db;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every field
/// is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Pool handle; per-request deadlines are applied by the `Stores` extractor
    pub db: Db,

    /// Token issue and validation
    pub identity: Arc<dyn IdentityProvider>,

    /// Password digest keyed by `HASH_SECRET`
    pub digester: SecretDigester,

    pub rate_limiter: Arc<RateLimiter>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state with an in-memory session store
    ///
    /// # Errors
    ///
    /// Fails if `HASH_SECRET` is too short to key the digest.
    pub fn new(pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let sessions = SessionStore::new(config.auth.session_config());
        Self::with_identity(pool, config, Arc::new(sessions))
    }

    /// Creates application state around a caller-supplied identity provider
    pub fn with_identity(
        pool: PgPool,
        config: Config,
        identity: Arc<dyn IdentityProvider>,
    ) -> anyhow::Result<Self> {
        let digester = SecretDigester::new(&config.auth.hash_secret)?;
        let rate_limiter = Arc::new(RateLimiter::new(config.api.rate_limit_per_minute));

        Ok(Self {
            db: Db::new(pool).with_timeout(config.request_timeout()),
            identity,
            digester,
            rate_limiter,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health                              (public)
/// ├── POST   /auth/signup                         (public)
/// ├── POST   /auth/login                          (public)
/// ├── GET    /auth/validate
/// ├── POST   /auth/logout
/// ├── GET    /statuses
/// ├── GET    /priorities
/// ├── POST   /projects
/// ├── GET    /projects
/// ├── GET    /projects/:id
/// ├── PUT    /projects/:id
/// ├── DELETE /projects/:id
/// ├── POST   /projects/:id/members/:member        (member = username)
/// ├── DELETE /projects/:id/members/:member        (member = user id)
/// ├── POST   /projects/:id/tasks
/// ├── GET    /projects/:id/tasks/:task_id
/// ├── PUT    /projects/:id/tasks/:task_id
/// └── DELETE /projects/:id/tasks/:task_id
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. Request id (set when absent, echoed on the response)
/// 2. Panic recovery
/// 3. Security headers
/// 4. CORS
/// 5. Logging (tower-http TraceLayer)
/// 6. Rate limiting
/// 7. Request deadline
/// 8. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/auth/validate", get(routes::auth::validate))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/statuses", get(routes::lookups::list_statuses))
        .route("/priorities", get(routes::lookups::list_priorities))
        .route(
            "/projects",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/projects/:id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/projects/:id/members/:member",
            post(routes::projects::add_member).delete(routes::projects::remove_member),
        )
        .route("/projects/:id/tasks", post(routes::tasks::create_task))
        .route(
            "/projects/:id/tasks/:task_id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id,
                user_id = tracing::field::Empty,
            )
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(state.clone(), stamp_deadline))
        .layer(from_fn_with_state(state.clone(), rate_limit_layer))
        .layer(trace)
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
