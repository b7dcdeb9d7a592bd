//! Middleware modules for the API server
//!
//! - `auth`: Bearer token resolution into an `AuthUser` extension
//! - `deadline`: per-request store deadline
//! - `rate_limit`: per-client token bucket
//! - `security`: hardening response headers

pub mod auth;
pub mod deadline;
pub mod rate_limit;
pub mod security;
