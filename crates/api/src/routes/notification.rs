//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                -> list_notifications
/// POST   /read-all        -> mark_all_read
/// GET    /unread-count    -> unread_count
/// POST   /{id}/read       -> mark_read
///
/// GET    /preferences     -> get_preferences
/// PUT    /preferences     -> update_preferences
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        // Inbox endpoints
        .route("/", get(notification::list_notifications))
        .route("/read-all", post(notification::mark_all_read))
        .route("/unread-count", get(notification::unread_count))
        .route("/{id}/read", post(notification::mark_read))
        // Preferences endpoints
        .route(
            "/preferences",
            get(notification::get_preferences).put(notification::update_preferences),
        )
}
