//! Notification entity models and DTOs.

use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub message: String,
    /// One of `info`, `warning`, `mention`.
    pub kind: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A row from the `notification_preferences` table. Absence of a row
/// means all emails are enabled.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub user_id: DbId,
    pub email_on_mention: bool,
    pub email_on_assignment: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for updating email preferences.
#[derive(Debug, Deserialize)]
pub struct UpdatePreferences {
    pub email_on_mention: Option<bool>,
    pub email_on_assignment: Option<bool>,
}
