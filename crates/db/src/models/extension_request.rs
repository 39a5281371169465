//! Extension-request entity models and DTOs.

use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `extension_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExtensionRequest {
    pub id: DbId,
    pub task_id: DbId,
    pub requester_id: DbId,
    pub requested_due_date: Timestamp,
    pub reason: String,
    /// One of `Pending`, `Approved`, `Rejected`.
    pub status: String,
    pub decided_by: Option<DbId>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating an extension request.
#[derive(Debug, Deserialize)]
pub struct CreateExtensionRequest {
    pub task_id: DbId,
    pub requested_due_date: Timestamp,
    pub reason: String,
}
