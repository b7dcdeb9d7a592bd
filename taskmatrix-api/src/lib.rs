//! # Task Matrix API Server Library
//!
//! HTTP surface over the Task Matrix data-access layer.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Deadline-bounded stores and validated JSON bodies
//! - `middleware`: Authentication, rate limiting, deadlines, security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
