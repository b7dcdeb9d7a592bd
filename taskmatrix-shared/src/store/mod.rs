//! Authorization-aware data-access layer
//!
//! Three capability groups share one [`Db`](crate::db::Db) handle:
//!
//! - [`users::UserDirectory`]: create users, find them by credentials
//! - [`projects::ProjectStore`]: project CRUD, membership, soft deletion
//! - [`tasks::TaskStore`]: task CRUD scoped to a project
//!
//! plus [`lookups::LookupStore`] for the read-only status and priority lists.
//!
//! Every operation takes the authenticated caller id explicitly, enforces the
//! owner/member rules itself and runs under the handle's deadline. Errors are
//! always [`StoreError`]; raw database messages never leave this layer.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use taskmatrix_shared::db::Db;
//! use taskmatrix_shared::models::project::NewProject;
//! use taskmatrix_shared::store::projects::ProjectStore;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool, alice_id: i32) -> Result<(), Box<dyn std::error::Error>> {
//! let projects = ProjectStore::new(Db::new(pool));
//!
//! let id = projects
//!     .create_project(alice_id, NewProject {
//!         title: "Bug Tracker".to_string(),
//!         description: String::new(),
//!         due_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
//!     })
//!     .await?;
//!
//! projects.add_member(alice_id, id, "bob").await?;
//! # Ok(())
//! # }
//! ```

pub mod lookups;
pub mod projects;
pub mod tasks;
pub mod users;

use crate::error::{StoreError, StoreResult};

/// Rejects empty or whitespace-only required text fields
pub(crate) fn require_text(field: &'static str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "Bug Tracker").is_ok());
        assert_eq!(
            require_text("title", "   "),
            Err(StoreError::Validation("title is required".to_string()))
        );
        assert!(require_text("name", "").is_err());
    }
}
