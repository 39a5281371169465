//! Route definitions for the `/workspaces` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::workspace;
use crate::state::AppState;

/// Routes mounted at `/workspaces`.
///
/// ```text
/// POST   /                 -> create
/// GET    /                 -> list (caller's workspaces)
/// GET    /{id}             -> get_by_id
/// PUT    /{id}/statuses    -> update_statuses (admin)
/// POST   /{id}/members     -> add_member (admin)
/// GET    /{id}/members     -> list_members
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(workspace::create).get(workspace::list))
        .route("/{id}", get(workspace::get_by_id))
        .route("/{id}/statuses", put(workspace::update_statuses))
        .route(
            "/{id}/members",
            post(workspace::add_member).get(workspace::list_members),
        )
}
