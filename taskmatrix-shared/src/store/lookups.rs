//! Read-only access to the status and priority tables

use tracing::debug;

use crate::db::Db;
use crate::error::StoreResult;
use crate::models::lookup::{Priority, Status};

#[derive(Debug, Clone)]
pub struct LookupStore {
    db: Db,
}

impl LookupStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list_statuses(&self) -> StoreResult<Vec<Status>> {
        let statuses = self
            .db
            .bounded("list_statuses", async { Ok(Status::list(self.db.pool()).await?) })
            .await?;

        debug!(count = statuses.len(), "Listed statuses");
        Ok(statuses)
    }

    pub async fn list_priorities(&self) -> StoreResult<Vec<Priority>> {
        let priorities = self
            .db
            .bounded("list_priorities", async { Ok(Priority::list(self.db.pool()).await?) })
            .await?;

        debug!(count = priorities.len(), "Listed priorities");
        Ok(priorities)
    }
}
