//! Task store
//!
//! Every operation first checks that the caller is a member of the live
//! project and fails with `PermissionDenied` before touching any row.
//! Mutations are scoped by task id and project id together, and run the
//! check and the write in one transaction.
//!
//! The assignee only has to exist; it is not required to be a project member.

use tracing::{debug, info};

use super::require_text;
use crate::auth::authorization::require_membership;
use crate::db::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::task::{Task, TaskInput, TaskView};

#[derive(Debug, Clone)]
pub struct TaskStore {
    db: Db,
}

impl TaskStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Creates a task in `project_id` and returns its id
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank or a referenced id is unknown
    /// - `PermissionDenied` if `caller_id` is not a member
    pub async fn create_task(&self, caller_id: i32, project_id: i32, data: TaskInput) -> StoreResult<i32> {
        require_text("title", &data.title)?;

        let task_id = self
            .db
            .bounded("create_task", async {
                let mut tx = self.db.pool().begin().await?;
                require_membership(&mut tx, project_id, caller_id).await?;
                let task_id = Task::insert(&mut *tx, project_id, &data).await?;
                tx.commit().await?;
                Ok(task_id)
            })
            .await?;

        info!(task_id, project_id, caller_id, assignee_id = data.assignee_id, "Task created");
        Ok(task_id)
    }

    /// Replaces a task's fields
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank or a referenced id is unknown
    /// - `PermissionDenied` if `caller_id` is not a member
    /// - `NotFound` if no task `task_id` exists in `project_id`
    pub async fn update_task(
        &self,
        caller_id: i32,
        project_id: i32,
        task_id: i32,
        data: TaskInput,
    ) -> StoreResult<()> {
        require_text("title", &data.title)?;

        self.db
            .bounded("update_task", async {
                let mut tx = self.db.pool().begin().await?;
                require_membership(&mut tx, project_id, caller_id).await?;
                if !Task::update_in_project(&mut *tx, project_id, task_id, &data).await? {
                    return Err(StoreError::not_found("task", task_id));
                }
                tx.commit().await?;
                Ok(())
            })
            .await?;

        info!(task_id, project_id, caller_id, "Task updated");
        Ok(())
    }

    /// Deletes a task; deleting an absent id is a no-op
    ///
    /// # Errors
    ///
    /// `PermissionDenied` if `caller_id` is not a member
    pub async fn delete_task(&self, caller_id: i32, project_id: i32, task_id: i32) -> StoreResult<()> {
        let deleted = self
            .db
            .bounded("delete_task", async {
                let mut tx = self.db.pool().begin().await?;
                require_membership(&mut tx, project_id, caller_id).await?;
                let deleted = Task::delete_in_project(&mut *tx, project_id, task_id).await?;
                tx.commit().await?;
                Ok(deleted)
            })
            .await?;

        if deleted {
            info!(task_id, project_id, caller_id, "Task deleted");
        } else {
            debug!(task_id, project_id, "Delete of absent task ignored");
        }
        Ok(())
    }

    /// One task with its lookups and assignee resolved
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if `caller_id` is not a member
    /// - `NotFound` if no task `task_id` exists in `project_id`
    pub async fn get_task(&self, caller_id: i32, project_id: i32, task_id: i32) -> StoreResult<TaskView> {
        self.db
            .bounded("get_task", async {
                let mut conn = self.db.pool().acquire().await?;
                require_membership(&mut conn, project_id, caller_id).await?;
                Ok(Task::find_view(&mut *conn, project_id, task_id).await?)
            })
            .await?
            .ok_or_else(|| StoreError::not_found("task", task_id))
    }
}
