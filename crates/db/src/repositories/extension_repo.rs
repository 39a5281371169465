//! Repository for the `extension_requests` table.

use ems_core::extension::STATUS_PENDING;
use ems_core::types::DbId;
use sqlx::PgPool;

use crate::models::extension_request::{CreateExtensionRequest, ExtensionRequest};

/// Column list for `extension_requests` queries.
const COLUMNS: &str = "id, task_id, requester_id, requested_due_date, reason, status, \
                       decided_by, decided_at, created_at";

/// Provides CRUD operations for deadline-extension requests.
pub struct ExtensionRepo;

impl ExtensionRepo {
    /// Insert a new Pending request, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateExtensionRequest,
        requester_id: DbId,
    ) -> Result<ExtensionRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO extension_requests (task_id, requester_id, requested_due_date, reason)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExtensionRequest>(&query)
            .bind(input.task_id)
            .bind(requester_id)
            .bind(input.requested_due_date)
            .bind(&input.reason)
            .fetch_one(pool)
            .await
    }

    /// Find a request by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ExtensionRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM extension_requests WHERE id = $1");
        sqlx::query_as::<_, ExtensionRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a workspace's pending requests, oldest first.
    pub async fn list_pending_for_workspace(
        pool: &PgPool,
        workspace_id: DbId,
    ) -> Result<Vec<ExtensionRequest>, sqlx::Error> {
        sqlx::query_as::<_, ExtensionRequest>(
            "SELECT e.id, e.task_id, e.requester_id, e.requested_due_date, e.reason, e.status,
                    e.decided_by, e.decided_at, e.created_at
             FROM extension_requests e
             JOIN tasks t ON t.id = e.task_id
             WHERE t.workspace_id = $1 AND e.status = $2
             ORDER BY e.created_at ASC",
        )
        .bind(workspace_id)
        .bind(STATUS_PENDING)
        .fetch_all(pool)
        .await
    }

    /// Move a Pending request to a terminal status, recording the decider.
    ///
    /// The `status = Pending` guard makes the transition race-safe: a
    /// second concurrent decision matches zero rows and returns `None`.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        new_status: &str,
        decided_by: DbId,
    ) -> Result<Option<ExtensionRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE extension_requests
             SET status = $2, decided_by = $3, decided_at = NOW()
             WHERE id = $1 AND status = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ExtensionRequest>(&query)
            .bind(id)
            .bind(new_status)
            .bind(decided_by)
            .bind(STATUS_PENDING)
            .fetch_optional(pool)
            .await
    }
}
