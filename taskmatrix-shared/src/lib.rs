//! # Task Matrix Shared Library
//!
//! Data model, relational store access and the authorization-aware
//! data-access layer used by the Task Matrix API server.
//!
//! ## Module Organization
//!
//! - `db`: connection pool, migrations, lookup seeding and the deadline-carrying [`db::Db`] handle
//! - `models`: table rows and their SQL
//! - `store`: User Directory, Project Store and Task Store
//! - `auth`: secret digest, identity provider and owner/member checks
//! - `error`: the [`error::StoreError`] taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

/// Current version of the Task Matrix shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
