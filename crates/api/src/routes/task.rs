//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// POST   /                                -> create
/// GET    /                                -> list (by workspace_id query)
/// GET    /{id}                            -> get_by_id (detail)
/// PUT    /{id}                            -> update
/// DELETE /{id}                            -> delete (soft)
///
/// POST   /{id}/status                     -> update_status
///
/// POST   /{id}/subtasks                   -> add_subtask
/// POST   /{id}/subtasks/{sid}/toggle      -> toggle_subtask
///
/// PUT    /{id}/recurrence                 -> upsert_recurrence
/// GET    /{id}/recurrence                 -> get_recurrence
/// DELETE /{id}/recurrence                 -> stop_recurrence
///
/// POST   /{id}/time-entries               -> log_time
/// GET    /{id}/time-entries               -> list_time_entries
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(task::create).get(task::list))
        .route(
            "/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
        // Status transitions
        .route("/{id}/status", post(task::update_status))
        // Subtasks
        .route("/{id}/subtasks", post(task::add_subtask))
        .route("/{id}/subtasks/{sid}/toggle", post(task::toggle_subtask))
        // Recurrence
        .route(
            "/{id}/recurrence",
            put(task::upsert_recurrence)
                .get(task::get_recurrence)
                .delete(task::stop_recurrence),
        )
        // Time entries
        .route(
            "/{id}/time-entries",
            post(task::log_time).get(task::list_time_entries),
        )
}
