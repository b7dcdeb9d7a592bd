//! Project model and database operations
//!
//! Projects are owned by the user who created them. Ownership never changes.
//! Soft deletion sets `deleted_at`; every read here filters such rows out.
//! Task counters are derived with correlated subqueries at read time.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE projects (
//!     id SERIAL PRIMARY KEY,
//!     owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     status_id INTEGER NOT NULL REFERENCES statuses(id),
//!     due_date DATE NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     deleted_at TIMESTAMPTZ
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::lookup::{Status, STATUS_COMPLETED};
use super::task::TaskView;
use super::user::UserIdentity;

/// Raw project row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Project {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub status_id: i32,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
}

/// Owner-editable fields
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub status_id: i32,
}

/// Project header shared by the summary and detail views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectHeader {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub status: Status,
    pub owner: UserIdentity,

    /// Number of tasks in the project
    pub total_tasks: i64,

    /// Number of tasks whose status is "Completed"
    pub tasks_completed: i64,
}

/// One entry of a user's project listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub header: ProjectHeader,
    pub members: Vec<UserIdentity>,
}

/// Full project view with members and tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub header: ProjectHeader,
    pub members: Vec<UserIdentity>,
    pub tasks: Vec<TaskView>,
}

/// Flat row produced by the header/aggregate query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HeaderRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub status_id: i32,
    pub status_name: String,
    pub owner_id: i32,
    pub owner_name: String,
    pub owner_username: String,
    pub owner_email: String,
    pub owner_avatar_url: String,
    pub total_tasks: i64,
    pub tasks_completed: i64,
}

impl From<HeaderRow> for ProjectHeader {
    fn from(row: HeaderRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            created_at: row.created_at,
            status: Status {
                id: row.status_id,
                name: row.status_name,
            },
            owner: UserIdentity {
                id: row.owner_id,
                name: row.owner_name,
                username: row.owner_username,
                email: row.owner_email,
                avatar_url: row.owner_avatar_url,
            },
            total_tasks: row.total_tasks,
            tasks_completed: row.tasks_completed,
        }
    }
}

const HEADER_COLUMNS: &str = r#"
    p.id, p.title, p.description, p.due_date, p.created_at,
    s.id AS status_id, s.name AS status_name,
    u.id AS owner_id, u.name AS owner_name, u.username AS owner_username,
    u.email AS owner_email, u.avatar_url AS owner_avatar_url,
    (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id) AS total_tasks,
    (SELECT COUNT(*)
       FROM tasks t
       JOIN statuses ts ON ts.id = t.status_id
      WHERE t.project_id = p.id AND ts.name = $1) AS tasks_completed
"#;

impl Project {
    /// Inserts the project row and returns its id
    pub async fn insert<'e, E>(
        executor: E,
        owner_id: i32,
        status_id: i32,
        data: &NewProject,
    ) -> Result<i32, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            INSERT INTO projects (owner_id, title, description, due_date, status_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(status_id)
        .fetch_one(executor)
        .await
    }

    /// Owner of a live project, if it exists
    pub async fn owner_of<'e, E>(executor: E, id: i32) -> Result<Option<i32>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT owner_id FROM projects WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Owner of a live project, share-locking the row until the transaction ends
    ///
    /// A concurrent soft delete blocks on the lock; if it committed first the
    /// row no longer qualifies and `None` is returned.
    pub async fn lock_live<'e, E>(executor: E, id: i32) -> Result<Option<i32>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT owner_id FROM projects WHERE id = $1 AND deleted_at IS NULL FOR SHARE")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Updates the project only when `owner_id` owns it; returns whether a row changed
    pub async fn update_owned<'e, E>(
        executor: E,
        id: i32,
        owner_id: i32,
        data: &ProjectUpdate,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET title = $1, description = $2, due_date = $3, status_id = $4
            WHERE id = $5 AND owner_id = $6 AND deleted_at IS NULL
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.due_date)
        .bind(data.status_id)
        .bind(id)
        .bind(owner_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks the project deleted when `owner_id` owns it; returns whether a row changed
    pub async fn soft_delete_owned<'e, E>(executor: E, id: i32, owner_id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET deleted_at = NOW()
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate rows for every live project the user owns or belongs to
    ///
    /// `EXISTS` keeps one row per project even when the user is both owner and
    /// member. `only` narrows the listing to a single project.
    pub async fn visible_headers<'e, E>(
        executor: E,
        user_id: i32,
        only: Option<i32>,
    ) -> Result<Vec<HeaderRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            SELECT {HEADER_COLUMNS}
            FROM projects p
            JOIN statuses s ON s.id = p.status_id
            JOIN users u ON u.id = p.owner_id
            WHERE p.deleted_at IS NULL
              AND (p.owner_id = $2
                   OR EXISTS (SELECT 1 FROM project_members pm
                              WHERE pm.project_id = p.id AND pm.user_id = $2))
              AND ($3::INTEGER IS NULL OR p.id = $3)
            ORDER BY p.created_at DESC, p.id DESC
            "#
        );

        sqlx::query_as::<_, HeaderRow>(&query)
            .bind(STATUS_COMPLETED)
            .bind(user_id)
            .bind(only)
            .fetch_all(executor)
            .await
    }

    /// Aggregate row for one live project, regardless of caller
    pub async fn header<'e, E>(executor: E, id: i32) -> Result<Option<HeaderRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            SELECT {HEADER_COLUMNS}
            FROM projects p
            JOIN statuses s ON s.id = p.status_id
            JOIN users u ON u.id = p.owner_id
            WHERE p.id = $2 AND p.deleted_at IS NULL
            "#
        );

        sqlx::query_as::<_, HeaderRow>(&query)
            .bind(STATUS_COMPLETED)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_row() -> HeaderRow {
        HeaderRow {
            id: 7,
            title: "Bug Tracker".to_string(),
            description: "Track bugs".to_string(),
            due_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            created_at: Utc::now(),
            status_id: 1,
            status_name: "TODO".to_string(),
            owner_id: 1,
            owner_name: "Alice Johnson".to_string(),
            owner_username: "alice".to_string(),
            owner_email: "alice@example.com".to_string(),
            owner_avatar_url: String::new(),
            total_tasks: 3,
            tasks_completed: 1,
        }
    }

    #[test]
    fn test_header_from_row() {
        let header = ProjectHeader::from(header_row());
        assert_eq!(header.id, 7);
        assert_eq!(header.status.name, "TODO");
        assert_eq!(header.owner.username, "alice");
        assert_eq!(header.total_tasks, 3);
        assert_eq!(header.tasks_completed, 1);
    }

    #[test]
    fn test_summary_serializes_flat() {
        let summary = ProjectSummary {
            header: ProjectHeader::from(header_row()),
            members: Vec::new(),
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["due_date"], "2025-12-31");
        assert_eq!(json["owner"]["username"], "alice");
        assert_eq!(json["total_tasks"], 3);
        assert!(json["members"].as_array().unwrap().is_empty());
    }
}
