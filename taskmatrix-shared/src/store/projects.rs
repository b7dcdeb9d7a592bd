//! Project store
//!
//! Owner-only mutations, membership management and the two-phase project
//! listing.
//!
//! # Listing
//!
//! [`ProjectStore::list_projects`] runs one aggregate query (one row per
//! visible project, task counters from correlated subqueries) and then one
//! member query for the whole returned id set. Members are merged in memory
//! by project id. The two reads are not in a transaction; a member added
//! concurrently may or may not show up.
//!
//! # Authorization outcomes
//!
//! | Operation             | absent / deleted | not owner / member |
//! |-----------------------|------------------|--------------------|
//! | `get_project_summary` | `NotFound`       | `PermissionDenied` |
//! | `get_project_detail`  | `NotFound`       | `PermissionDenied` |
//! | `update_project`      | `NotFound`       | `PermissionDenied` |
//! | `add_member`          | `NotFound`       | `PermissionDenied` |
//! | `remove_member`       | `NotFound`       | `PermissionDenied` |
//! | `soft_delete_project` | `NotFound`       | `PermissionDenied` |

use tracing::{debug, error, info, warn};

use super::require_text;
use crate::auth::authorization::{require_owner, REASON_NOT_MEMBER, REASON_NOT_OWNER};
use crate::db::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::lookup::{Status, STATUS_TODO};
use crate::models::membership::{group_by_project, ProjectMember};
use crate::models::project::{
    HeaderRow, NewProject, Project, ProjectDetail, ProjectHeader, ProjectSummary, ProjectUpdate,
};
use crate::models::task::Task;
use crate::models::user::UserIdentity;

#[derive(Debug, Clone)]
pub struct ProjectStore {
    db: Db,
}

impl ProjectStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Creates a project owned by `owner_id` and returns its id
    ///
    /// The project row and the owner's membership are inserted in one
    /// transaction. The initial status is resolved by name.
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank or the owner does not exist
    /// - `Internal` if the status table was never seeded
    pub async fn create_project(&self, owner_id: i32, data: NewProject) -> StoreResult<i32> {
        require_text("title", &data.title)?;

        let project_id = self
            .db
            .bounded("create_project", self.insert_with_owner(owner_id, &data))
            .await?;

        info!(project_id, owner_id, title = %data.title, "Project created");
        Ok(project_id)
    }

    async fn insert_with_owner(&self, owner_id: i32, data: &NewProject) -> StoreResult<i32> {
        let mut tx = self.db.pool().begin().await?;

        let todo = Status::find_by_name(&mut *tx, STATUS_TODO)
            .await?
            .ok_or_else(|| {
                error!(status = STATUS_TODO, "Lookup table not seeded");
                StoreError::Internal
            })?;

        let project_id = Project::insert(&mut *tx, owner_id, todo.id, data).await?;
        ProjectMember::add(&mut *tx, project_id, owner_id).await?;

        tx.commit().await?;
        Ok(project_id)
    }

    /// Every live project `user_id` owns or belongs to, newest first
    ///
    /// Returns an empty list when the user has no projects.
    pub async fn list_projects(&self, user_id: i32) -> StoreResult<Vec<ProjectSummary>> {
        let summaries = self
            .db
            .bounded("list_projects", self.summaries(user_id, None))
            .await?;

        debug!(user_id, count = summaries.len(), "Listed projects");
        Ok(summaries)
    }

    /// One project as it appears in the caller's listing
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent or soft-deleted
    /// - `PermissionDenied` if `caller_id` neither owns nor belongs to it
    pub async fn get_project_summary(&self, caller_id: i32, project_id: i32) -> StoreResult<ProjectSummary> {
        self.db
            .bounded("get_project_summary", self.summary(caller_id, project_id))
            .await
    }

    async fn summary(&self, caller_id: i32, project_id: i32) -> StoreResult<ProjectSummary> {
        if let Some(summary) = self.summaries(caller_id, Some(project_id)).await?.into_iter().next() {
            return Ok(summary);
        }

        match Project::owner_of(self.db.pool(), project_id).await? {
            Some(_) => Err(StoreError::denied("project", project_id, REASON_NOT_MEMBER)),
            None => Err(StoreError::not_found("project", project_id)),
        }
    }

    async fn summaries(&self, user_id: i32, only: Option<i32>) -> StoreResult<Vec<ProjectSummary>> {
        let headers: Vec<HeaderRow> = Project::visible_headers(self.db.pool(), user_id, only).await?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = headers.iter().map(|h| h.id).collect();
        let mut members = group_by_project(ProjectMember::list_for_projects(self.db.pool(), &ids).await?);

        Ok(headers
            .into_iter()
            .map(|row| {
                let members = members.remove(&row.id).unwrap_or_default();
                ProjectSummary {
                    header: ProjectHeader::from(row),
                    members,
                }
            })
            .collect())
    }

    /// Header, members and tasks of one project
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent or soft-deleted
    /// - `PermissionDenied` if `caller_id` is not a member
    pub async fn get_project_detail(&self, caller_id: i32, project_id: i32) -> StoreResult<ProjectDetail> {
        let detail = self
            .db
            .bounded("get_project_detail", self.detail(caller_id, project_id))
            .await?;

        debug!(project_id, caller_id, tasks = detail.tasks.len(), "Loaded project detail");
        Ok(detail)
    }

    async fn detail(&self, caller_id: i32, project_id: i32) -> StoreResult<ProjectDetail> {
        let header = Project::header(self.db.pool(), project_id)
            .await?
            .ok_or_else(|| StoreError::not_found("project", project_id))?;

        if !ProjectMember::is_member(self.db.pool(), project_id, caller_id).await? {
            warn!(project_id, caller_id, "Detail requested by non-member");
            return Err(StoreError::denied("project", project_id, REASON_NOT_MEMBER));
        }

        let members = ProjectMember::list_for_project(self.db.pool(), project_id).await?;
        let tasks = Task::list_views(self.db.pool(), project_id).await?;

        Ok(ProjectDetail {
            header: ProjectHeader::from(header),
            members,
            tasks,
        })
    }

    /// Replaces the editable fields and returns the caller's refreshed summary
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank or the status id is unknown
    /// - `NotFound` if the project is absent or soft-deleted
    /// - `PermissionDenied` if `caller_id` is not the owner; nothing changes
    pub async fn update_project(
        &self,
        caller_id: i32,
        project_id: i32,
        data: ProjectUpdate,
    ) -> StoreResult<ProjectSummary> {
        require_text("title", &data.title)?;

        let summary = self
            .db
            .bounded("update_project", self.update(caller_id, project_id, &data))
            .await?;

        info!(project_id, caller_id, status_id = data.status_id, "Project updated");
        Ok(summary)
    }

    async fn update(&self, caller_id: i32, project_id: i32, data: &ProjectUpdate) -> StoreResult<ProjectSummary> {
        let updated = Project::update_owned(self.db.pool(), project_id, caller_id, data).await?;
        if !updated {
            return Err(self.explain_owner_miss(project_id, caller_id).await);
        }

        self.summaries(caller_id, Some(project_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found("project", project_id))
    }

    /// Adds the user named `username` to the project and returns them
    ///
    /// Re-adding an existing member is a no-op that still returns the user.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project or the user does not exist
    /// - `PermissionDenied` if `caller_id` is not the owner
    pub async fn add_member(&self, caller_id: i32, project_id: i32, username: &str) -> StoreResult<UserIdentity> {
        let (user, inserted) = self
            .db
            .bounded("add_member", self.add(caller_id, project_id, username))
            .await?;

        if inserted {
            info!(project_id, user_id = user.id, "Member added");
        } else {
            debug!(project_id, user_id = user.id, "Member already present");
        }
        Ok(user)
    }

    async fn add(&self, caller_id: i32, project_id: i32, username: &str) -> StoreResult<(UserIdentity, bool)> {
        let mut tx = self.db.pool().begin().await?;
        require_owner(&mut tx, project_id, caller_id).await?;

        let user = UserIdentity::find_by_username(&mut *tx, username)
            .await?
            .ok_or_else(|| StoreError::not_found("user", username))?;

        let inserted = ProjectMember::add(&mut *tx, project_id, user.id).await?;
        tx.commit().await?;
        Ok((user, inserted))
    }

    /// Removes `user_id` from the project; removing a non-member is a no-op
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent or soft-deleted
    /// - `PermissionDenied` if `caller_id` is not the owner
    /// - `InvalidOperation` if `user_id` is the owner
    pub async fn remove_member(&self, caller_id: i32, project_id: i32, user_id: i32) -> StoreResult<()> {
        let removed = self
            .db
            .bounded("remove_member", self.remove(caller_id, project_id, user_id))
            .await?;

        if removed {
            info!(project_id, user_id, "Member removed");
        } else {
            debug!(project_id, user_id, "Remove of non-member ignored");
        }
        Ok(())
    }

    async fn remove(&self, caller_id: i32, project_id: i32, user_id: i32) -> StoreResult<bool> {
        let mut tx = self.db.pool().begin().await?;
        let owner_id = require_owner(&mut tx, project_id, caller_id).await?;

        if user_id == owner_id {
            return Err(StoreError::InvalidOperation(format!(
                "the owner cannot be removed from project {}",
                project_id
            )));
        }

        let removed = ProjectMember::remove(&mut *tx, project_id, user_id).await?;
        tx.commit().await?;
        Ok(removed)
    }

    /// Marks the project deleted
    ///
    /// Tasks and memberships stay in storage but become unreachable.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent or already deleted
    /// - `PermissionDenied` if `caller_id` is not the owner
    pub async fn soft_delete_project(&self, caller_id: i32, project_id: i32) -> StoreResult<()> {
        self.db
            .bounded("soft_delete_project", async {
                if Project::soft_delete_owned(self.db.pool(), project_id, caller_id).await? {
                    Ok(())
                } else {
                    Err(self.explain_owner_miss(project_id, caller_id).await)
                }
            })
            .await?;

        info!(project_id, caller_id, "Project soft-deleted");
        Ok(())
    }

    /// Tells apart "no such project" from "not yours" after an owner-scoped
    /// statement touched zero rows
    async fn explain_owner_miss(&self, project_id: i32, caller_id: i32) -> StoreError {
        match Project::owner_of(self.db.pool(), project_id).await {
            Ok(None) => StoreError::not_found("project", project_id),
            Ok(Some(_)) => {
                warn!(project_id, caller_id, "Owner-only mutation by non-owner");
                StoreError::denied("project", project_id, REASON_NOT_OWNER)
            }
            Err(e) => e.into(),
        }
    }
}
