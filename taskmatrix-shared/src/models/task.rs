//! Task model and database operations
//!
//! A task belongs to exactly one project and is hard-deleted. Mutations are
//! always scoped by both `id` and `project_id`, so a task id paired with the
//! wrong project never touches a row.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id SERIAL PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL DEFAULT '',
//!     priority_id INTEGER NOT NULL REFERENCES priorities(id),
//!     status_id INTEGER NOT NULL REFERENCES statuses(id),
//!     assignee_id INTEGER NOT NULL REFERENCES users(id),
//!     project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_shared::models::task::{Task, TaskInput};
//! use taskmatrix_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let input = TaskInput {
//!     title: "Write tests".to_string(),
//!     description: String::new(),
//!     priority_id: 2,
//!     status_id: 1,
//!     assignee_id: 1,
//! };
//!
//! let id = Task::insert(&pool, 10, &input).await?;
//! let views = Task::list_views(&pool, 10).await?;
//! assert!(views.iter().any(|t| t.id == id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

use super::lookup::{Priority, Status};
use super::user::UserIdentity;

/// Raw task row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub priority_id: i32,
    pub status_id: i32,
    pub assignee_id: i32,
    pub project_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating or replacing a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub priority_id: i32,
    pub status_id: i32,
    pub assignee_id: i32,
}

/// Task with its lookups and assignee resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub priority: Priority,
    pub status: Status,
    pub assignee: UserIdentity,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct TaskViewRow {
    id: i32,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
    priority_id: i32,
    priority_name: String,
    status_id: i32,
    status_name: String,
    assignee_id: i32,
    assignee_name: String,
    assignee_username: String,
    assignee_email: String,
    assignee_avatar_url: String,
}

impl From<TaskViewRow> for TaskView {
    fn from(row: TaskViewRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            priority: Priority {
                id: row.priority_id,
                name: row.priority_name,
            },
            status: Status {
                id: row.status_id,
                name: row.status_name,
            },
            assignee: UserIdentity {
                id: row.assignee_id,
                name: row.assignee_name,
                username: row.assignee_username,
                email: row.assignee_email,
                avatar_url: row.assignee_avatar_url,
            },
        }
    }
}

const VIEW_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.created_at,
           pr.id AS priority_id, pr.name AS priority_name,
           s.id AS status_id, s.name AS status_name,
           u.id AS assignee_id, u.name AS assignee_name, u.username AS assignee_username,
           u.email AS assignee_email, u.avatar_url AS assignee_avatar_url
    FROM tasks t
    JOIN priorities pr ON pr.id = t.priority_id
    JOIN statuses s ON s.id = t.status_id
    JOIN users u ON u.id = t.assignee_id
"#;

impl Task {
    /// Inserts a task into `project_id` and returns its id
    pub async fn insert<'e, E>(executor: E, project_id: i32, data: &TaskInput) -> Result<i32, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            INSERT INTO tasks (title, description, priority_id, status_id, assignee_id, project_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority_id)
        .bind(data.status_id)
        .bind(data.assignee_id)
        .bind(project_id)
        .fetch_one(executor)
        .await
    }

    /// Replaces the mutable fields of a task; returns whether a row changed
    pub async fn update_in_project<'e, E>(
        executor: E,
        project_id: i32,
        task_id: i32,
        data: &TaskInput,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $1, description = $2, priority_id = $3, status_id = $4, assignee_id = $5
            WHERE id = $6 AND project_id = $7
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority_id)
        .bind(data.status_id)
        .bind(data.assignee_id)
        .bind(task_id)
        .bind(project_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a task; returns whether a row was removed
    pub async fn delete_in_project<'e, E>(executor: E, project_id: i32, task_id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND project_id = $2")
            .bind(task_id)
            .bind(project_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn find_in_project<'e, E>(
        executor: E,
        project_id: i32,
        task_id: i32,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority_id, status_id, assignee_id, project_id, created_at
            FROM tasks
            WHERE id = $1 AND project_id = $2
            "#,
        )
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(executor)
        .await
    }

    /// All tasks of a project with lookups resolved, oldest first
    pub async fn list_views<'e, E>(executor: E, project_id: i32) -> Result<Vec<TaskView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("{VIEW_SELECT} WHERE t.project_id = $1 ORDER BY t.created_at, t.id");

        let rows = sqlx::query_as::<_, TaskViewRow>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await?;

        Ok(rows.into_iter().map(TaskView::from).collect())
    }

    /// One task of a project with lookups resolved
    pub async fn find_view<'e, E>(
        executor: E,
        project_id: i32,
        task_id: i32,
    ) -> Result<Option<TaskView>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("{VIEW_SELECT} WHERE t.id = $1 AND t.project_id = $2");

        let row = sqlx::query_as::<_, TaskViewRow>(&query)
            .bind(task_id)
            .bind(project_id)
            .fetch_optional(executor)
            .await?;

        Ok(row.map(TaskView::from))
    }
}
