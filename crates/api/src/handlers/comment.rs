//! Handlers for the `/comments` resource: threaded listing, creation
//! with mention fan-out, author-scoped editing, tombstone deletion,
//! pinning, and reactions.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use ems_core::comment::{entity_types, is_valid_entity_type, validate_body};
use ems_core::error::CoreError;
use ems_core::threading::build_threads;
use ems_core::types::DbId;
use ems_db::models::comment::{Comment, CreateComment, UpdateComment};
use ems_db::repositories::{CommentRepo, ProjectRepo, TaskRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::require_member;
use crate::middleware::auth::AuthUser;
use crate::notifications::MentionNotifier;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /comments`.
#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub entity_type: String,
    pub entity_id: DbId,
}

/// Threaded comments for rendering: pinned top-level first, then the
/// rest newest-first, with each parent's direct replies oldest-first.
#[derive(Debug, Serialize)]
pub struct ThreadedComments {
    pub top_level: Vec<Comment>,
    pub children: HashMap<DbId, Vec<Comment>>,
}

/// Request body for `POST /comments/{id}/reactions`.
#[derive(Debug, Deserialize)]
pub struct ReactionRequest {
    pub emoji: String,
}

/// Request body for `POST /comments/{id}/pin`.
#[derive(Debug, Deserialize)]
pub struct PinRequest {
    pub pinned: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/comments
///
/// Create a comment on a task or project. `@mentions` in the body fan
/// out to in-app notifications (guaranteed) and email (best-effort).
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    if !is_valid_entity_type(&input.entity_type) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Comments cannot attach to entity type '{}'",
            input.entity_type
        ))));
    }
    validate_body(&input.body)?;

    let workspace_id = resolve_entity_workspace(&state, &input.entity_type, input.entity_id).await?;
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    if let Some(parent_id) = input.parent_comment_id {
        let parent = CommentRepo::find_by_id(&state.pool, parent_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Comment",
                id: parent_id,
            }))?;
        if parent.entity_type != input.entity_type || parent.entity_id != input.entity_id {
            return Err(AppError::Core(CoreError::Validation(
                "Parent comment belongs to a different entity".into(),
            )));
        }
        // One level of nesting only: replying to a reply would never
        // surface in the rendered thread, so reject it outright.
        if parent.parent_comment_id.is_some() {
            return Err(AppError::Core(CoreError::Validation(
                "Replies to replies are not supported".into(),
            )));
        }
    }

    let comment = CommentRepo::create(&state.pool, &input, auth.user_id).await?;

    // Mention fan-out. The comment is already stored; a fan-out failure
    // must not undo it.
    let author_name = match UserRepo::find_by_id(&state.pool, auth.user_id).await {
        Ok(Some(user)) => user.display_name,
        _ => auth.email.clone(),
    };
    let notifier = MentionNotifier::from_state(&state);
    if let Err(e) = notifier
        .handle_mentions(
            &input.body,
            auth.user_id,
            &auth.email,
            &author_name,
            &input.entity_type,
            input.entity_id,
            workspace_id,
        )
        .await
    {
        tracing::error!(comment_id = comment.id, error = %e, "Mention fan-out failed");
    }

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/comments?entity_type={type}&entity_id={id}
///
/// List an entity's comments as display threads. Tombstoned comments
/// keep their position and render as placeholders.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<CommentQuery>,
) -> AppResult<Json<ThreadedComments>> {
    if !is_valid_entity_type(&params.entity_type) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Comments cannot attach to entity type '{}'",
            params.entity_type
        ))));
    }
    let workspace_id =
        resolve_entity_workspace(&state, &params.entity_type, params.entity_id).await?;
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    let comments =
        CommentRepo::list_for_entity(&state.pool, &params.entity_type, params.entity_id).await?;
    let threads = build_threads(comments);

    Ok(Json(ThreadedComments {
        top_level: threads.top_level,
        children: threads.children,
    }))
}

/// PUT /api/v1/comments/{id}
///
/// Edit a comment body. Author only; stamps `edited_at`.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateComment>,
) -> AppResult<Json<Comment>> {
    validate_body(&input.body)?;

    let updated = CommentRepo::update_body(&state.pool, id, auth.user_id, &input.body)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/comments/{id}
///
/// Tombstone a comment. The record stays and renders as a placeholder to
/// everyone, including the author. Author only.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CommentRepo::soft_delete(&state.pool, id, auth.user_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))
    }
}

/// POST /api/v1/comments/{id}/pin
///
/// Pin or unpin a comment so it leads the thread listing.
pub async fn set_pinned(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PinRequest>,
) -> AppResult<Json<Comment>> {
    let comment = CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;
    let workspace_id =
        resolve_entity_workspace(&state, &comment.entity_type, comment.entity_id).await?;
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    let updated = CommentRepo::set_pinned(&state.pool, id, input.pinned)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;
    Ok(Json(updated))
}

/// POST /api/v1/comments/{id}/reactions
///
/// Toggle the caller's reaction under the given emoji.
pub async fn toggle_reaction(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReactionRequest>,
) -> AppResult<Json<Comment>> {
    if input.emoji.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Reaction emoji must not be empty".into(),
        )));
    }

    let comment = CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;
    let workspace_id =
        resolve_entity_workspace(&state, &comment.entity_type, comment.entity_id).await?;
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    let updated = CommentRepo::toggle_reaction(&state.pool, id, &input.emoji, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Comment",
            id,
        }))?;
    Ok(Json(updated))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the workspace owning a commentable entity, or not-found when
/// the entity id does not resolve.
async fn resolve_entity_workspace(
    state: &AppState,
    entity_type: &str,
    entity_id: DbId,
) -> Result<DbId, AppError> {
    match entity_type {
        entity_types::TASK => Ok(TaskRepo::find_by_id(&state.pool, entity_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Task",
                id: entity_id,
            }))?
            .workspace_id),
        entity_types::PROJECT => Ok(ProjectRepo::find_by_id(&state.pool, entity_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: entity_id,
            }))?
            .workspace_id),
        other => Err(AppError::Core(CoreError::Validation(format!(
            "Comments cannot attach to entity type '{other}'"
        )))),
    }
}
