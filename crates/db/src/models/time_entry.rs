//! Time-entry entity models and DTOs.

use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `time_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub task_id: DbId,
    pub user_id: DbId,
    pub duration_secs: i32,
    pub description: Option<String>,
    pub logged_at: Timestamp,
}

/// DTO for logging time against a task.
#[derive(Debug, Deserialize)]
pub struct CreateTimeEntry {
    pub duration_secs: i32,
    pub description: Option<String>,
}
