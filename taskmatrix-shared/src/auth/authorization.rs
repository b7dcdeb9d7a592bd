//! Ownership and membership checks
//!
//! # Permission Model
//!
//! 1. **Owner**: the creator of a project. Only the owner may update or
//!    delete it, or change its member set.
//! 2. **Member**: any user in the project's member set. Owners are always
//!    members. Members may read the project and manage its tasks.
//!
//! Both checks only recognise live projects; a soft-deleted project has no
//! owner and no members as far as authorization is concerned.
//!
//! Run inside a transaction, a check share-locks the project row, so a soft
//! delete cannot commit between the check and the caller's write.
//!
//! # Example
//!
//! ```no_run
//! use taskmatrix_shared::auth::authorization::{require_membership, require_owner};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let mut tx = pool.begin().await?;
//! require_owner(&mut tx, 10, 1).await?;
//! require_membership(&mut tx, 10, 2).await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

use sqlx::PgConnection;
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::models::membership::ProjectMember;
use crate::models::project::Project;

pub const REASON_NOT_OWNER: &str = "caller is not the project owner";
pub const REASON_NOT_MEMBER: &str = "caller is not a project member";

/// Checks that `user_id` owns the live project and returns the owner id
///
/// # Errors
///
/// - `NotFound` if the project is absent or soft-deleted
/// - `PermissionDenied` if someone else owns it
pub async fn require_owner(conn: &mut PgConnection, project_id: i32, user_id: i32) -> StoreResult<i32> {
    let owner_id = Project::lock_live(&mut *conn, project_id)
        .await?
        .ok_or_else(|| StoreError::not_found("project", project_id))?;

    if owner_id != user_id {
        warn!(project_id, user_id, "Owner check failed");
        return Err(StoreError::denied("project", project_id, REASON_NOT_OWNER));
    }

    Ok(owner_id)
}

/// Checks that `user_id` is a member of the live project
///
/// # Errors
///
/// Returns `PermissionDenied` if the user is not a member, including when the
/// project is absent or soft-deleted.
pub async fn require_membership(conn: &mut PgConnection, project_id: i32, user_id: i32) -> StoreResult<()> {
    let live = Project::lock_live(&mut *conn, project_id).await?.is_some();

    if !live || !ProjectMember::is_member(&mut *conn, project_id, user_id).await? {
        warn!(project_id, user_id, "Membership check failed");
        return Err(StoreError::denied("project", project_id, REASON_NOT_MEMBER));
    }

    Ok(())
}
