//! Route composition.

pub mod auth;
pub mod comment;
pub mod extension;
pub mod health;
pub mod notification;
pub mod project;
pub mod task;
pub mod workspace;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                 register (public)
/// /auth/login                    login (public)
/// /auth/me                       current user
///
/// /workspaces                    create, list mine
/// /workspaces/{id}               get
/// /workspaces/{id}/statuses      replace status vocabulary (admin)
/// /workspaces/{id}/members       add (admin), list
///
/// /projects                      create, list by workspace
/// /projects/{id}                 get, update, soft delete
///
/// /tasks                         create, list by workspace (+urgency)
/// /tasks/{id}                    get detail, update, soft delete
/// /tasks/{id}/status             transition status (POST)
/// /tasks/{id}/subtasks           add subtask
/// /tasks/{id}/subtasks/{sid}/toggle  toggle completion
/// /tasks/{id}/recurrence         upsert, get, stop
/// /tasks/{id}/time-entries       log, list
///
/// /comments                      create (mention fan-out), threaded list
/// /comments/{id}                 edit, tombstone delete
/// /comments/{id}/pin             pin/unpin
/// /comments/{id}/reactions       toggle reaction
///
/// /notifications                 inbox listing
/// /notifications/read-all        mark all read
/// /notifications/unread-count    unread count
/// /notifications/{id}/read       mark one read
/// /notifications/preferences     get, update email preferences
///
/// /extensions                    file request, list pending (admin)
/// /extensions/{id}/approve       approve (admin)
/// /extensions/{id}/reject        reject (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/workspaces", workspace::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/comments", comment::router())
        .nest("/notifications", notification::router())
        .nest("/extensions", extension::router())
}
