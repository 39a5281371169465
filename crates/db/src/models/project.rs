//! Project entity models and DTOs.

use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub workspace_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
    pub status: String,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub workspace_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
}

/// DTO for updating a project. Only non-`None` fields are applied.
#[derive(Debug, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<Timestamp>,
    pub status: Option<String>,
}
