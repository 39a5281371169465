//! Repository for the `workspaces` and `workspace_members` tables.

use ems_core::roles::{ROLE_OWNER, ROLE_WORKSPACE_ADMIN};
use ems_core::types::DbId;
use sqlx::PgPool;

use crate::models::workspace::{MemberWithUser, Workspace, WorkspaceMember};

/// Column list for `workspaces` queries.
const COLUMNS: &str = "id, name, owner_id, statuses, created_at, updated_at";

/// Column list for `workspace_members` queries.
const MEMBER_COLUMNS: &str = "id, workspace_id, user_id, role, created_at";

/// Provides CRUD operations for workspaces and their memberships.
pub struct WorkspaceRepo;

impl WorkspaceRepo {
    /// Insert a workspace and its owner membership in one transaction.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        owner_id: DbId,
        statuses: &serde_json::Value,
    ) -> Result<Workspace, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workspaces (name, owner_id, statuses)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let workspace = sqlx::query_as::<_, Workspace>(&query)
            .bind(name)
            .bind(owner_id)
            .bind(statuses)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO workspace_members (workspace_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(workspace.id)
        .bind(owner_id)
        .bind(ROLE_OWNER)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(workspace)
    }

    /// Find a workspace by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workspace>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workspaces WHERE id = $1");
        sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List workspaces the given user is a member of, most recent first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Workspace>, sqlx::Error> {
        sqlx::query_as::<_, Workspace>(
            "SELECT w.id, w.name, w.owner_id, w.statuses, w.created_at, w.updated_at
             FROM workspaces w
             JOIN workspace_members m ON m.workspace_id = w.id
             WHERE m.user_id = $1
             ORDER BY w.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the workspace's status vocabulary. Returns the updated row,
    /// or `None` if the workspace does not exist.
    pub async fn update_statuses(
        pool: &PgPool,
        id: DbId,
        statuses: &serde_json::Value,
    ) -> Result<Option<Workspace>, sqlx::Error> {
        let query = format!(
            "UPDATE workspaces SET statuses = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .bind(statuses)
            .fetch_optional(pool)
            .await
    }

    /// Add a member to a workspace.
    pub async fn add_member(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<WorkspaceMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO workspace_members (workspace_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, WorkspaceMember>(&query)
            .bind(workspace_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Find a membership row for a user in a workspace.
    pub async fn find_member(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
    ) -> Result<Option<WorkspaceMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM workspace_members
             WHERE workspace_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, WorkspaceMember>(&query)
            .bind(workspace_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// List all members of a workspace joined with their user records.
    pub async fn list_members(
        pool: &PgPool,
        workspace_id: DbId,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithUser>(
            "SELECT m.user_id, u.email, u.display_name, m.role
             FROM workspace_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.workspace_id = $1
             ORDER BY m.created_at ASC",
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await
    }

    /// List the workspace's owners and admins (the extension-request
    /// deciders and admin-notification recipients).
    pub async fn list_admins(
        pool: &PgPool,
        workspace_id: DbId,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithUser>(
            "SELECT m.user_id, u.email, u.display_name, m.role
             FROM workspace_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.workspace_id = $1 AND m.role IN ($2, $3)
             ORDER BY m.created_at ASC",
        )
        .bind(workspace_id)
        .bind(ROLE_OWNER)
        .bind(ROLE_WORKSPACE_ADMIN)
        .fetch_all(pool)
        .await
    }
}
