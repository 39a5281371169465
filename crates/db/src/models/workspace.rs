//! Workspace and membership entity models and DTOs.

use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `workspaces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workspace {
    pub id: DbId,
    pub name: String,
    pub owner_id: DbId,
    /// Ordered status vocabulary stored as a JSONB string array.
    pub statuses: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Workspace {
    /// The workspace's status vocabulary as owned strings, in board order.
    /// Non-string entries (which the write path never produces) are skipped.
    pub fn status_names(&self) -> Vec<String> {
        self.statuses
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A row from the `workspace_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkspaceMember {
    pub id: DbId,
    pub workspace_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}

/// A membership row joined with the member's user record, used for
/// member listings and mention resolution.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberWithUser {
    pub user_id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

/// DTO for creating a workspace. Omitted statuses fall back to the
/// canonical default set.
#[derive(Debug, Deserialize)]
pub struct CreateWorkspace {
    pub name: String,
    pub statuses: Option<Vec<String>>,
}

/// DTO for adding a member by email.
#[derive(Debug, Deserialize)]
pub struct AddMember {
    pub email: String,
    pub role: Option<String>,
}

/// DTO for replacing the workspace status vocabulary.
#[derive(Debug, Deserialize)]
pub struct UpdateStatuses {
    pub statuses: Vec<String>,
}
