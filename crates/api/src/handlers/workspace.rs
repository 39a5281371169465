//! Handlers for the `/workspaces` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use ems_core::error::CoreError;
use ems_core::roles::{is_valid_role, ROLE_EMPLOYEE, VALID_ROLES};
use ems_core::status::{validate_status_set, DEFAULT_STATUSES};
use ems_core::types::DbId;
use ems_db::models::workspace::{AddMember, CreateWorkspace, MemberWithUser, UpdateStatuses, Workspace, WorkspaceMember};
use ems_db::repositories::{UserRepo, WorkspaceRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::{require_admin, require_member};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/workspaces
///
/// Create a workspace owned by the caller. Omitted statuses fall back to
/// the canonical default set.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateWorkspace>,
) -> AppResult<(StatusCode, Json<Workspace>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Workspace name must not be empty".into(),
        )));
    }

    let statuses: Vec<String> = input
        .statuses
        .unwrap_or_else(|| DEFAULT_STATUSES.iter().map(|s| s.to_string()).collect());
    validate_status_set(&statuses)?;

    let workspace = WorkspaceRepo::create(
        &state.pool,
        input.name.trim(),
        auth.user_id,
        &serde_json::json!(statuses),
    )
    .await?;

    tracing::info!(workspace_id = workspace.id, owner_id = auth.user_id, "Workspace created");
    Ok((StatusCode::CREATED, Json(workspace)))
}

/// GET /api/v1/workspaces
///
/// List workspaces the caller belongs to.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<Json<Vec<Workspace>>> {
    let workspaces = WorkspaceRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(workspaces))
}

/// GET /api/v1/workspaces/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Workspace>> {
    require_member(&state.pool, id, auth.user_id).await?;
    let workspace = WorkspaceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workspace",
            id,
        }))?;
    Ok(Json(workspace))
}

/// PUT /api/v1/workspaces/{id}/statuses
///
/// Replace the workspace's status vocabulary (admin only). The set must
/// stay non-empty and duplicate-free.
pub async fn update_statuses(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatuses>,
) -> AppResult<Json<Workspace>> {
    require_admin(&state.pool, id, auth.user_id).await?;
    validate_status_set(&input.statuses)?;

    let workspace = WorkspaceRepo::update_statuses(&state.pool, id, &serde_json::json!(input.statuses))
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workspace",
            id,
        }))?;
    Ok(Json(workspace))
}

/// POST /api/v1/workspaces/{id}/members
///
/// Add a registered user to the workspace by email (admin only).
pub async fn add_member(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddMember>,
) -> AppResult<(StatusCode, Json<WorkspaceMember>)> {
    require_admin(&state.pool, id, auth.user_id).await?;

    let role = input.role.unwrap_or_else(|| ROLE_EMPLOYEE.to_string());
    if !is_valid_role(&role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))));
    }

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "No registered user with email {}",
                input.email
            )))
        })?;

    let member = WorkspaceRepo::add_member(&state.pool, id, user.id, &role).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /api/v1/workspaces/{id}/members
pub async fn list_members(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<MemberWithUser>>> {
    require_member(&state.pool, id, auth.user_id).await?;
    let members = WorkspaceRepo::list_members(&state.pool, id).await?;
    Ok(Json(members))
}
