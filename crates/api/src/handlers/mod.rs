//! HTTP handlers, one module per resource.

pub mod auth;
pub mod comment;
pub mod extension;
pub mod notification;
pub mod project;
pub mod task;
pub mod workspace;

use ems_core::error::CoreError;
use ems_core::roles::is_admin;
use ems_core::types::DbId;
use ems_db::models::workspace::WorkspaceMember;
use ems_db::repositories::WorkspaceRepo;
use sqlx::PgPool;

use crate::error::AppError;

/// Look up the caller's membership in a workspace, rejecting non-members.
pub(crate) async fn require_member(
    pool: &PgPool,
    workspace_id: DbId,
    user_id: DbId,
) -> Result<WorkspaceMember, AppError> {
    WorkspaceRepo::find_member(pool, workspace_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Not a member of this workspace".into(),
            ))
        })
}

/// Like [`require_member`], but additionally requires an owner or
/// workspace-admin role.
pub(crate) async fn require_admin(
    pool: &PgPool,
    workspace_id: DbId,
    user_id: DbId,
) -> Result<WorkspaceMember, AppError> {
    let member = require_member(pool, workspace_id, user_id).await?;
    if !is_admin(&member.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Requires an owner or workspace admin role".into(),
        )));
    }
    Ok(member)
}
