//! Handlers for the `/extensions` resource: the deadline-extension
//! approval workflow.
//!
//! Filing a request notifies every workspace admin in-app and publishes
//! an email event per admin. Deciding is admin-only; approval does not
//! move the task's due date -- the deciding admin updates the task
//! separately.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ems_core::error::CoreError;
use ems_core::extension::{STATUS_APPROVED, STATUS_PENDING, STATUS_REJECTED};
use ems_core::notification::KIND_INFO;
use ems_core::types::DbId;
use ems_db::models::extension_request::{CreateExtensionRequest, ExtensionRequest};
use ems_db::models::workspace::MemberWithUser;
use ems_db::repositories::{ExtensionRepo, NotificationRepo, TaskRepo, UserRepo, WorkspaceRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::{require_admin, require_member};
use crate::middleware::auth::AuthUser;
use crate::notifications::links::entity_link;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /extensions`.
#[derive(Debug, Deserialize)]
pub struct ExtensionQuery {
    pub workspace_id: DbId,
}

/// Response for a filed request: the record plus the admins who were
/// notified, so the client can render who will decide.
#[derive(Debug, Serialize)]
pub struct ExtensionFiled {
    pub request: ExtensionRequest,
    pub notified_admins: Vec<MemberWithUser>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/extensions
///
/// File a deadline-extension request for a task.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateExtensionRequest>,
) -> AppResult<(StatusCode, Json<ExtensionFiled>)> {
    if input.reason.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A reason for the extension is required".into(),
        )));
    }

    let task = TaskRepo::find_by_id(&state.pool, input.task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: input.task_id,
        }))?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let request = ExtensionRepo::create(&state.pool, &input, auth.user_id).await?;

    let requester_name = match UserRepo::find_by_id(&state.pool, auth.user_id).await? {
        Some(user) => user.display_name,
        None => auth.email.clone(),
    };

    let admins = WorkspaceRepo::list_admins(&state.pool, task.workspace_id).await?;
    let link = entity_link(&state.config.app_base_url, "task");
    let message = format!(
        "{requester_name} requested a deadline extension on \"{}\"",
        task.title
    );

    for admin in &admins {
        // The requester may themselves be an admin; they don't need to
        // hear about their own request.
        if admin.user_id == auth.user_id {
            continue;
        }

        if let Err(e) = NotificationRepo::create(
            &state.pool,
            admin.user_id,
            "Extension requested",
            &message,
            KIND_INFO,
            Some(&link),
        )
        .await
        {
            tracing::error!(
                admin_id = admin.user_id,
                error = %e,
                "Failed to store extension notification"
            );
            continue;
        }

        state.event_bus.publish(
            ems_events::DomainEvent::new(ems_events::event_types::EXTENSION_REQUESTED)
                .with_source("task", task.id)
                .with_actor(auth.user_id)
                .with_payload(serde_json::json!({
                    "recipient_id": admin.user_id,
                    "recipient_email": admin.email,
                    "requester_name": requester_name,
                    "task_title": task.title,
                    "link": link,
                })),
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(ExtensionFiled {
            request,
            notified_admins: admins,
        }),
    ))
}

/// GET /api/v1/extensions?workspace_id={id}
///
/// List a workspace's pending requests (admin only).
pub async fn list_pending(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExtensionQuery>,
) -> AppResult<Json<Vec<ExtensionRequest>>> {
    require_admin(&state.pool, params.workspace_id, auth.user_id).await?;
    let requests =
        ExtensionRepo::list_pending_for_workspace(&state.pool, params.workspace_id).await?;
    Ok(Json(requests))
}

/// POST /api/v1/extensions/{id}/approve
pub async fn approve(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ExtensionRequest>> {
    decide(auth, state, id, STATUS_APPROVED).await
}

/// POST /api/v1/extensions/{id}/reject
pub async fn reject(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ExtensionRequest>> {
    decide(auth, state, id, STATUS_REJECTED).await
}

/// Shared approve/reject path: admin check, Pending-only transition,
/// requester notification.
async fn decide(
    auth: AuthUser,
    state: AppState,
    id: DbId,
    new_status: &str,
) -> AppResult<Json<ExtensionRequest>> {
    let request = ExtensionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ExtensionRequest",
            id,
        }))?;

    let task = TaskRepo::find_by_id(&state.pool, request.task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Task",
            id: request.task_id,
        }))?;
    require_admin(&state.pool, task.workspace_id, auth.user_id).await?;

    if request.status != STATUS_PENDING {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Request was already {}",
            request.status
        ))));
    }

    // The Pending guard in the update also covers a concurrent decision.
    let decided = ExtensionRepo::decide(&state.pool, id, new_status, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Request was decided by someone else".into(),
            ))
        })?;

    let message = format!(
        "Your extension request on \"{}\" was {}",
        task.title,
        decided.status.to_lowercase()
    );
    if let Err(e) = NotificationRepo::create(
        &state.pool,
        decided.requester_id,
        "Extension decided",
        &message,
        KIND_INFO,
        Some(&entity_link(&state.config.app_base_url, "task")),
    )
    .await
    {
        tracing::error!(request_id = id, error = %e, "Failed to notify requester of decision");
    }

    Ok(Json(decided))
}
