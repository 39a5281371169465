//! Route definitions for the `/comments` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::comment;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// POST   /                  -> create (mention fan-out)
/// GET    /                  -> list (threaded, by entity query)
/// PUT    /{id}              -> update (author only)
/// DELETE /{id}              -> delete (tombstone, author only)
/// POST   /{id}/pin          -> set_pinned
/// POST   /{id}/reactions    -> toggle_reaction
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(comment::create).get(comment::list))
        .route(
            "/{id}",
            axum::routing::put(comment::update).delete(comment::delete),
        )
        .route("/{id}/pin", post(comment::set_pinned))
        .route("/{id}/reactions", post(comment::toggle_reaction))
}
