//! Repository for the `task_recurrences` table.

use ems_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::recurrence::{TaskRecurrence, UpsertRecurrence};

/// Column list for `task_recurrences` queries.
const COLUMNS: &str = "task_id, pattern, interval_days, day_of_week, day_of_month, end_date, \
                       last_generated, is_active, created_at, updated_at";

/// Provides CRUD operations for recurrence rules.
pub struct RecurrenceRepo;

impl RecurrenceRepo {
    /// Create or replace a task's recurrence rule. Re-upserting
    /// reactivates a stopped rule.
    pub async fn upsert(
        pool: &PgPool,
        task_id: DbId,
        input: &UpsertRecurrence,
        default_start: Timestamp,
    ) -> Result<TaskRecurrence, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_recurrences
                (task_id, pattern, interval_days, day_of_week, day_of_month, end_date, last_generated)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, $8))
             ON CONFLICT (task_id) DO UPDATE SET
                pattern = $2,
                interval_days = $3,
                day_of_week = $4,
                day_of_month = $5,
                end_date = $6,
                last_generated = COALESCE($7, task_recurrences.last_generated),
                is_active = TRUE,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TaskRecurrence>(&query)
            .bind(task_id)
            .bind(&input.pattern)
            .bind(input.interval_days)
            .bind(input.day_of_week)
            .bind(input.day_of_month)
            .bind(input.end_date)
            .bind(input.start_from)
            .bind(default_start)
            .fetch_one(pool)
            .await
    }

    /// Find a task's recurrence rule.
    pub async fn find_for_task(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Option<TaskRecurrence>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM task_recurrences WHERE task_id = $1");
        sqlx::query_as::<_, TaskRecurrence>(&query)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// List all active recurrence rules, oldest template first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<TaskRecurrence>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM task_recurrences
             WHERE is_active = TRUE
             ORDER BY task_id ASC"
        );
        sqlx::query_as::<_, TaskRecurrence>(&query)
            .fetch_all(pool)
            .await
    }

    /// Stop a recurrence (its end date has passed, or the user turned it
    /// off). Returns `true` if an active rule was deactivated.
    pub async fn deactivate(pool: &PgPool, task_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE task_recurrences SET is_active = FALSE, updated_at = NOW()
             WHERE task_id = $1 AND is_active = TRUE",
        )
        .bind(task_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Advance `last_generated` from `prev` to `next`.
    ///
    /// The `last_generated = prev` guard is the idempotency check for
    /// overlapping job runs: a concurrent run that already advanced the
    /// rule matches zero rows, and the caller must then skip generation.
    pub async fn advance_last_generated(
        pool: &PgPool,
        task_id: DbId,
        prev: Timestamp,
        next: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE task_recurrences
             SET last_generated = $3, updated_at = NOW()
             WHERE task_id = $1 AND last_generated = $2",
        )
        .bind(task_id)
        .bind(prev)
        .bind(next)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
