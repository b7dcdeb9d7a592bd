//! Error taxonomy for the data-access layer
//!
//! Every store operation returns [`StoreResult`]. Variants carry the entity kind
//! and the offending id or key so callers can render a precise response without
//! ever seeing raw storage-engine messages.
//!
//! # Classification of `sqlx` errors
//!
//! | sqlx error                                   | StoreError      |
//! |----------------------------------------------|-----------------|
//! | unique violation                             | `Conflict`      |
//! | foreign key / not null / check violation     | `Validation`    |
//! | pool timed out / closed, I/O, TLS            | `Unavailable`   |
//! | `RowNotFound`                                | `NotFound`      |
//! | anything else                                | `Internal`      |

use sqlx::error::ErrorKind;
use tracing::{error, warn};

/// Result alias used throughout the store
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors produced by the data-access layer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No caller identity, or the presented credential is invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the ownership or membership the operation requires
    #[error("Permission denied on {entity} {id}: {reason}")]
    PermissionDenied {
        entity: &'static str,
        id: i32,
        reason: &'static str,
    },

    /// Target entity is absent or soft-deleted
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// Unique constraint violated (duplicate username, email, ...)
    #[error("Conflict on {entity}: {detail}")]
    Conflict { entity: &'static str, detail: String },

    /// Domain rule violation, e.g. removing a project's owner
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Missing or malformed input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Storage unreachable or the call exceeded its deadline
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Unexpected storage failure; details are logged, never surfaced
    #[error("Internal storage error")]
    Internal,
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn denied(entity: &'static str, id: i32, reason: &'static str) -> Self {
        StoreError::PermissionDenied { entity, id, reason }
    }
}

/// Maps a constraint name from the schema to the entity it guards
fn constraint_entity(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(c) if c.starts_with("users_") => "user",
        Some(c) if c.starts_with("project_members_") => "project_member",
        Some(c) if c.starts_with("projects_") => "project",
        Some(c) if c.starts_with("tasks_") => "task",
        _ => "record",
    }
}

fn conflict_detail(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_username_key") => "username already exists".to_string(),
        Some("users_email_key") => "email already exists".to_string(),
        Some("project_members_pkey") => "user is already a member".to_string(),
        Some(other) => format!("duplicate value for {}", other),
        None => "duplicate value".to_string(),
    }
}

fn reference_detail(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.ends_with("status_id_fkey") => "unknown status id".to_string(),
        Some(c) if c.ends_with("priority_id_fkey") => "unknown priority id".to_string(),
        Some(c) if c.ends_with("assignee_id_fkey") => "unknown assignee id".to_string(),
        Some(c) if c.ends_with("owner_id_fkey") => "unknown owner id".to_string(),
        Some(c) if c.ends_with("user_id_fkey") => "unknown user id".to_string(),
        Some(c) if c.ends_with("project_id_fkey") => "unknown project id".to_string(),
        Some(other) => format!("invalid reference ({})", other),
        None => "invalid reference".to_string(),
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found("record", "row"),
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => StoreError::Conflict {
                        entity: constraint_entity(constraint),
                        detail: conflict_detail(constraint),
                    },
                    ErrorKind::ForeignKeyViolation => {
                        StoreError::Validation(reference_detail(constraint))
                    }
                    ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
                        warn!(error = %db_err, "Rejected row");
                        StoreError::Validation("missing or malformed field".to_string())
                    }
                    _ => {
                        error!(error = %db_err, "Database error");
                        StoreError::Internal
                    }
                }
            }
            sqlx::Error::PoolTimedOut => {
                warn!("Timed out acquiring a database connection");
                StoreError::Unavailable("connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".to_string()),
            sqlx::Error::Io(e) => {
                error!(error = %e, "Database I/O error");
                StoreError::Unavailable("database unreachable".to_string())
            }
            sqlx::Error::Tls(e) => {
                error!(error = %e, "Database TLS error");
                StoreError::Unavailable("database unreachable".to_string())
            }
            other => {
                error!(error = %other, "Database error");
                StoreError::Internal
            }
        }
    }
}
