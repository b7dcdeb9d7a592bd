//! Status and priority lookup tables
//!
//! Both tables hold a fixed set of rows seeded once (see
//! [`crate::db::migrations::seed_lookups`]) and are read-only to the store.
//! Code resolves rows by name rather than relying on seed order for ids.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE statuses (id SERIAL PRIMARY KEY, name TEXT NOT NULL UNIQUE);
//! CREATE TABLE priorities (id SERIAL PRIMARY KEY, name TEXT NOT NULL UNIQUE);
//! ```

use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

pub const STATUS_TODO: &str = "TODO";
pub const STATUS_IN_PROGRESS: &str = "In Progress";
pub const STATUS_REVIEW: &str = "Review";
pub const STATUS_COMPLETED: &str = "Completed";

/// All statuses in workflow order
pub const STATUS_NAMES: [&str; 4] = [STATUS_TODO, STATUS_IN_PROGRESS, STATUS_REVIEW, STATUS_COMPLETED];

pub const PRIORITY_LOW: &str = "Low";
pub const PRIORITY_MEDIUM: &str = "Medium";
pub const PRIORITY_HIGH: &str = "High";
pub const PRIORITY_CRITICAL: &str = "Critical";

/// All priorities from lowest to highest
pub const PRIORITY_NAMES: [&str; 4] = [PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH, PRIORITY_CRITICAL];

/// Workflow status shared by projects and tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    pub id: i32,
    pub name: String,
}

/// Task priority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Priority {
    pub id: i32,
    pub name: String,
}

impl Status {
    /// Looks a status up by its well-known name
    pub async fn find_by_name<'e, E>(executor: E, name: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Status>("SELECT id, name FROM statuses WHERE name = $1")
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Status>("SELECT id, name FROM statuses ORDER BY id")
            .fetch_all(executor)
            .await
    }
}

impl Priority {
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Priority>("SELECT id, name FROM priorities ORDER BY id")
            .fetch_all(executor)
            .await
    }
}
