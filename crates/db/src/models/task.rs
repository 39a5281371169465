//! Task, subtask, and status-history entity models and DTOs.

use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub workspace_id: DbId,
    pub project_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
    pub status: String,
    pub priority: String,
    pub due_date: Option<Timestamp>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub completion_pct: i16,
    pub created_by: Option<DbId>,
    pub deadline_warned_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `subtasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subtask {
    pub id: DbId,
    pub task_id: DbId,
    pub title: String,
    pub is_completed: bool,
    pub position: i32,
}

/// A row from the `task_status_history` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusHistoryEntry {
    pub id: DbId,
    pub task_id: DbId,
    pub from_status: String,
    pub to_status: String,
    pub changed_by: Option<DbId>,
    pub changed_at: Timestamp,
}

/// DTO for creating a task.
#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub workspace_id: DbId,
    pub project_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<Timestamp>,
    pub start_date: Option<Timestamp>,
}

/// DTO for updating a task. Only non-`None` fields are applied; the
/// status field is intentionally absent -- status moves through the
/// transition endpoint so history stays consistent.
#[derive(Debug, Deserialize)]
pub struct UpdateTask {
    pub project_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<DbId>,
    pub priority: Option<String>,
    pub due_date: Option<Timestamp>,
    pub start_date: Option<Timestamp>,
    pub completion_pct: Option<i16>,
}

/// DTO for adding a subtask.
#[derive(Debug, Deserialize)]
pub struct CreateSubtask {
    pub title: String,
    pub position: Option<i32>,
}
