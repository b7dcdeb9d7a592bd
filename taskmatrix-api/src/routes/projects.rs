//! Project endpoints
//!
//! # Endpoints
//!
//! - `POST /projects` - Create a project owned by the caller
//! - `GET /projects` - Projects the caller owns or belongs to
//! - `GET /projects/:id` - Header, members and tasks (members only)
//! - `PUT /projects/:id` - Replace editable fields (owner only)
//! - `DELETE /projects/:id` - Soft delete (owner only)
//! - `POST /projects/:id/members/:username` - Add a member (owner only)
//! - `DELETE /projects/:id/members/:user_id` - Remove a member (owner only)
//!
//! The project title is sent as `name`; `title` is accepted as an alias.

use crate::{
    error::ApiResult,
    extract::{Stores, ValidatedJson},
    middleware::auth::AuthUser,
};
use axum::{extract::Path, http::StatusCode, Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use taskmatrix_shared::models::{
    project::{NewProject, ProjectDetail, ProjectSummary, ProjectUpdate},
    user::UserIdentity,
};
use validator::Validate;

use super::{non_blank, required};

/// Create project request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateProjectRequest {
    #[serde(alias = "title")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 200, message = "Name must be at most 200 characters")
    )]
    pub name: String,

    pub description: String,

    /// `YYYY-MM-DD`
    #[validate(required(message = "Due date is required"))]
    pub due_date: Option<NaiveDate>,
}

/// Update project request; every field is replaced
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateProjectRequest {
    #[serde(alias = "title")]
    #[validate(
        custom(function = "non_blank"),
        length(max = 200, message = "Name must be at most 200 characters")
    )]
    pub name: String,

    pub description: String,

    #[validate(required(message = "Due date is required"))]
    pub due_date: Option<NaiveDate>,

    #[validate(required(message = "Status is required"))]
    pub status_id: Option<i32>,
}

/// Creates a project; the caller becomes owner and first member
///
/// # Response
///
/// `201 Created` with the project as it appears in `GET /projects`
///
/// # Errors
///
/// - `400 Bad Request`: Malformed JSON or date
/// - `422 Unprocessable Entity`: Blank name or missing due date
pub async fn create_project(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectSummary>)> {
    let data = NewProject {
        title: req.name.trim().to_string(),
        description: req.description,
        due_date: required(req.due_date, "due_date")?,
    };

    let project_id = stores.projects.create_project(auth.id(), data).await?;
    let summary = stores.projects.get_project_summary(auth.id(), project_id).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn list_projects(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    Ok(Json(stores.projects.list_projects(auth.id()).await?))
}

/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Project is absent or deleted
pub async fn get_project(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<i32>,
) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(
        stores.projects.get_project_detail(auth.id(), project_id).await?,
    ))
}

/// Replaces name, description, due date and status
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Project is absent or deleted
/// - `422 Unprocessable Entity`: Validation failed or unknown status id
pub async fn update_project(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateProjectRequest>,
) -> ApiResult<Json<ProjectSummary>> {
    let data = ProjectUpdate {
        title: req.name.trim().to_string(),
        description: req.description,
        due_date: required(req.due_date, "due_date")?,
        status_id: required(req.status_id, "status_id")?,
    };

    Ok(Json(
        stores.projects.update_project(auth.id(), project_id, data).await?,
    ))
}

pub async fn delete_project(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<i32>,
) -> ApiResult<StatusCode> {
    stores.projects.soft_delete_project(auth.id(), project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adds the named user; adding an existing member is a no-op
///
/// # Response
///
/// The added user
pub async fn add_member(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, username)): Path<(i32, String)>,
) -> ApiResult<Json<UserIdentity>> {
    Ok(Json(
        stores.projects.add_member(auth.id(), project_id, &username).await?,
    ))
}

/// # Errors
///
/// - `422 Unprocessable Entity`: The owner cannot be removed
pub async fn remove_member(
    stores: Stores,
    Extension(auth): Extension<AuthUser>,
    Path((project_id, user_id)): Path<(i32, i32)>,
) -> ApiResult<StatusCode> {
    stores.projects.remove_member(auth.id(), project_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
