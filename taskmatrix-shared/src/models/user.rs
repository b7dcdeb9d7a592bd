//! User model and database operations
//!
//! Users are created at signup and are immutable afterwards. The password
//! digest is computed by the caller (see [`crate::auth::digest`]) and compared
//! here by plain equality.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id SERIAL PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     username TEXT NOT NULL,
//!     email TEXT NOT NULL,
//!     avatar_url TEXT NOT NULL DEFAULT '',
//!     password_digest TEXT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CONSTRAINT users_username_key UNIQUE (username),
//!     CONSTRAINT users_email_key UNIQUE (email)
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Full user row, including the password digest
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,

    /// Never serialized; only compared at login
    pub password_digest: String,

    pub created_at: DateTime<Utc>,
}

/// Public view of a user
///
/// This is what the identity provider hands out and what appears as a
/// project owner, member or task assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserIdentity {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub avatar_url: String,

    /// Pre-computed digest of the secret, not the secret itself
    pub password_digest: String,
}

impl From<User> for UserIdentity {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

impl User {
    /// Inserts a user and returns its id
    ///
    /// # Errors
    ///
    /// Unique violations on `users_username_key` / `users_email_key` surface as
    /// `sqlx::Error::Database` and are classified as conflicts by the store.
    pub async fn create<'e, E>(executor: E, data: &NewUser) -> Result<i32, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, username, email, avatar_url, password_digest)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&data.name)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.avatar_url)
        .bind(&data.password_digest)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i32) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, email, avatar_url, password_digest, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Exact match on username and digest
    pub async fn find_by_credentials<'e, E>(
        executor: E,
        username: &str,
        password_digest: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, email, avatar_url, password_digest, created_at
            FROM users
            WHERE username = $1 AND password_digest = $2
            "#,
        )
        .bind(username)
        .bind(password_digest)
        .fetch_optional(executor)
        .await
    }
}

impl UserIdentity {
    pub async fn find_by_username<'e, E>(executor: E, username: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserIdentity>(
            "SELECT id, name, username, email, avatar_url FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(executor)
        .await
    }
}
