//! Repository for the `time_entries` table.

use ems_core::types::DbId;
use sqlx::PgPool;

use crate::models::time_entry::{CreateTimeEntry, TimeEntry};

/// Column list for `time_entries` queries.
const COLUMNS: &str = "id, task_id, user_id, duration_secs, description, logged_at";

/// Provides CRUD operations for logged work time.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Log time against a task, returning the created row.
    pub async fn create(
        pool: &PgPool,
        task_id: DbId,
        user_id: DbId,
        input: &CreateTimeEntry,
    ) -> Result<TimeEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO time_entries (task_id, user_id, duration_secs, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .bind(user_id)
            .bind(input.duration_secs)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// List a task's time entries, newest first.
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries
             WHERE task_id = $1
             ORDER BY logged_at DESC"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Total logged seconds for a task.
    pub async fn total_secs_for_task(pool: &PgPool, task_id: DbId) -> Result<i64, sqlx::Error> {
        let total: Option<i64> = sqlx::query_scalar(
            "SELECT COALESCE(SUM(duration_secs), 0) FROM time_entries WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_one(pool)
        .await?;
        Ok(total.unwrap_or(0))
    }
}
