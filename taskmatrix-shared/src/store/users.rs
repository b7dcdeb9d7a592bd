//! User directory
//!
//! Signup inserts a user; login finds one by username and a pre-computed
//! digest. Users are never updated or deleted.

use tracing::{debug, info};

use super::require_text;
use crate::db::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::user::{NewUser, User, UserIdentity};

#[derive(Debug, Clone)]
pub struct UserDirectory {
    db: Db,
}

impl UserDirectory {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Creates a user and returns the new id
    ///
    /// # Errors
    ///
    /// - `Validation` if name, username, email or digest is blank
    /// - `Conflict` if the username or email is taken; nothing is inserted
    pub async fn create_user(&self, data: NewUser) -> StoreResult<i32> {
        require_text("name", &data.name)?;
        require_text("username", &data.username)?;
        require_text("email", &data.email)?;
        require_text("password_digest", &data.password_digest)?;

        let id = self
            .db
            .bounded("create_user", async {
                Ok(User::create(self.db.pool(), &data).await?)
            })
            .await?;

        info!(user_id = id, username = %data.username, "User created");
        Ok(id)
    }

    /// Finds the user whose username and digest both match exactly
    ///
    /// # Errors
    ///
    /// `NotFound` if no user matches; the error does not say which part failed.
    pub async fn find_user_by_credentials(&self, username: &str, password_digest: &str) -> StoreResult<User> {
        let user = self
            .db
            .bounded("find_user_by_credentials", async {
                Ok(User::find_by_credentials(self.db.pool(), username, password_digest).await?)
            })
            .await?;

        match user {
            Some(user) => {
                debug!(user_id = user.id, "Credentials matched");
                Ok(user)
            }
            None => {
                debug!(username, "No user for credentials");
                Err(StoreError::not_found("user", username))
            }
        }
    }

    pub async fn find_by_id(&self, id: i32) -> StoreResult<UserIdentity> {
        self.db
            .bounded("find_user_by_id", async {
                Ok(User::find_by_id(self.db.pool(), id).await?)
            })
            .await?
            .map(UserIdentity::from)
            .ok_or_else(|| StoreError::not_found("user", id))
    }
}
