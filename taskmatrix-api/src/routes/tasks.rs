//! Task endpoints
//!
//! Every task route is scoped to a project the caller belongs to. A task id
//! from another project behaves as if it did not exist.
//!
//! - `POST /projects/:id/tasks`
//! - `GET /projects/:id/tasks/:task_id`
//! - `PUT /projects/:id/tasks/:task_id`
//! - `DELETE /projects/:id/tasks/:task_id`

use crate::{
    error::ApiResult,
    extract::{Stores, ValidatedJson},
    middleware::auth::AuthUser,
};
use axum::{extract::Path, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskmatrix_shared::models::task::{TaskInput, TaskView};
use validator::Validate;

use super::{non_blank, required};

/// Body for both create and update
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TaskRequest {
    #[validate(
        custom(function = "non_blank"),
        length(max = 200, message = "Title must be at most 200 characters")
    )]
    pub title: String,

    pub description: String,

    #[validate(required(message = "Priority is required"))]
    pub priority_id: Option<i32>,

    #[validate(required(message = "Status is required"))]
    pub status_id: Option<i32>,

    #[validate(required(message = "Assignee is required"))]
    pub assignee_id: Option<i32>,
}

impl TaskRequest {
    fn into_input(self) -> ApiResult<TaskInput> {
        Ok(TaskInput {
            title: self.title.trim().to_string(),
            description: self.description,
            priority_id: required(self.priority_id, "priority_id")?,
            status_id: required(self.status_id, "status_id")?,
            assignee_id: required(self.assignee_id, "assignee_id")?,
        })
    }
}

/// Creates a task in the project
///
/// The assignee must be an existing user but need not be a project member.
///
/// # Response
///
/// `201 Created` with the task and its resolved status, priority and assignee
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member, or the project is deleted
/// - `422 Unprocessable Entity`: Validation failed or an unknown lookup/user id
pub async fn create_task(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<i32>,
    ValidatedJson(req): ValidatedJson<TaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let input = req.into_input()?;

    let task_id = stores.tasks.create_task(auth.id(), project_id, input).await?;
    let view = stores.tasks.get_task(auth.id(), project_id, task_id).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_task(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, task_id)): Path<(i32, i32)>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(stores.tasks.get_task(auth.id(), project_id, task_id).await?))
}

/// Replaces every field of the task
///
/// # Errors
///
/// - `404 Not Found`: No such task in this project
pub async fn update_task(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, task_id)): Path<(i32, i32)>,
    ValidatedJson(req): ValidatedJson<TaskRequest>,
) -> ApiResult<Json<TaskView>> {
    let input = req.into_input()?;

    stores
        .tasks
        .update_task(auth.id(), project_id, task_id, input)
        .await?;

    Ok(Json(stores.tasks.get_task(auth.id(), project_id, task_id).await?))
}

/// Deletes the task; deleting an absent task still answers 204
pub async fn delete_task(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, task_id)): Path<(i32, i32)>,
) -> ApiResult<StatusCode> {
    stores.tasks.delete_task(auth.id(), project_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
