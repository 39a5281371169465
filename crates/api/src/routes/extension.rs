//! Route definitions for the `/extensions` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::extension;
use crate::state::AppState;

/// Routes mounted at `/extensions`.
///
/// ```text
/// POST   /                -> create (file a request)
/// GET    /                -> list_pending (admin, by workspace query)
/// POST   /{id}/approve    -> approve (admin)
/// POST   /{id}/reject     -> reject (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(extension::create).get(extension::list_pending))
        .route("/{id}/approve", post(extension::approve))
        .route("/{id}/reject", post(extension::reject))
}
