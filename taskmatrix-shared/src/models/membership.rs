//! Project membership model and database operations
//!
//! A membership is a `(project_id, user_id)` pair; the primary key guarantees a
//! user is either a member or not. The owner is inserted as a member when the
//! project is created.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE project_members (
//!     project_id INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
//!     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     PRIMARY KEY (project_id, user_id)
//! );
//! ```

use std::collections::HashMap;

use sqlx::PgExecutor;

use super::user::UserIdentity;

/// Membership row joined with the member's public profile
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberRow {
    pub project_id: i32,
    #[sqlx(flatten)]
    pub user: UserIdentity,
}

pub struct ProjectMember;

impl ProjectMember {
    /// Adds a user to a project
    ///
    /// Returns `true` if a row was inserted, `false` if the user was already a
    /// member. Re-adding is a no-op.
    pub async fn add<'e, E>(executor: E, project_id: i32, user_id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (project_id, user_id) DO NOTHING
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a user from a project; returns `false` if they were not a member
    pub async fn remove<'e, E>(executor: E, project_id: i32, user_id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether `user_id` is a member of the live (not soft-deleted) project
    pub async fn is_member<'e, E>(executor: E, project_id: i32, user_id: i32) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM project_members pm
                JOIN projects p ON p.id = pm.project_id
                WHERE pm.project_id = $1 AND pm.user_id = $2 AND p.deleted_at IS NULL
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await
    }

    /// Members of every project in `project_ids`, in one round trip
    pub async fn list_for_projects<'e, E>(executor: E, project_ids: &[i32]) -> Result<Vec<MemberRow>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT pm.project_id, u.id, u.name, u.username, u.email, u.avatar_url
            FROM project_members pm
            JOIN users u ON u.id = pm.user_id
            WHERE pm.project_id = ANY($1)
            ORDER BY pm.project_id, pm.created_at, u.id
            "#,
        )
        .bind(project_ids)
        .fetch_all(executor)
        .await
    }

    pub async fn list_for_project<'e, E>(executor: E, project_id: i32) -> Result<Vec<UserIdentity>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserIdentity>(
            r#"
            SELECT u.id, u.name, u.username, u.email, u.avatar_url
            FROM project_members pm
            JOIN users u ON u.id = pm.user_id
            WHERE pm.project_id = $1
            ORDER BY pm.created_at, u.id
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}

/// Groups member rows by project id
pub fn group_by_project(rows: Vec<MemberRow>) -> HashMap<i32, Vec<UserIdentity>> {
    let mut grouped: HashMap<i32, Vec<UserIdentity>> = HashMap::new();
    for row in rows {
        grouped.entry(row.project_id).or_default().push(row.user);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(project_id: i32, id: i32, username: &str) -> MemberRow {
        MemberRow {
            project_id,
            user: UserIdentity {
                id,
                name: username.to_uppercase(),
                username: username.to_string(),
                email: format!("{}@example.com", username),
                avatar_url: String::new(),
            },
        }
    }

    #[test]
    fn test_group_by_project() {
        let rows = vec![
            member(1, 10, "alice"),
            member(1, 11, "bob"),
            member(2, 11, "bob"),
        ];

        let grouped = group_by_project(rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&1].len(), 2);
        assert_eq!(grouped[&1][0].username, "alice");
        assert_eq!(grouped[&2][0].id, 11);
    }

    #[test]
    fn test_group_by_project_empty() {
        assert!(group_by_project(Vec::new()).is_empty());
    }
}
