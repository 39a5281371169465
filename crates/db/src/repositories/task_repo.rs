//! Repository for the `tasks`, `subtasks`, and `task_status_history` tables.

use ems_core::status::should_stamp_end_date;
use ems_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::task::{CreateSubtask, CreateTask, StatusHistoryEntry, Subtask, Task, UpdateTask};

/// Column list for `tasks` queries.
const COLUMNS: &str = "id, workspace_id, project_id, title, description, assignee_id, status, \
                       priority, due_date, start_date, end_date, completion_pct, created_by, \
                       deadline_warned_at, deleted_at, created_at, updated_at";

/// Column list for `task_status_history` queries.
const HISTORY_COLUMNS: &str = "id, task_id, from_status, to_status, changed_by, changed_at";

/// Column list for `subtasks` queries.
const SUBTASK_COLUMNS: &str = "id, task_id, title, is_completed, position";

/// Optional filters for task listings.
#[derive(Debug, Default)]
pub struct TaskFilters {
    pub project_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub status: Option<String>,
}

/// Provides CRUD and lifecycle operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    ///
    /// Missing status/priority fall back to the column defaults.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTask,
        created_by: DbId,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (workspace_id, project_id, title, description, assignee_id,
                                status, priority, due_date, start_date, created_by)
             VALUES ($1, $2, $3, $4, $5,
                     COALESCE($6, 'To Do'), COALESCE($7, 'Normal'), $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.workspace_id)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.assignee_id)
            .bind(&input.status)
            .bind(&input.priority)
            .bind(input.due_date)
            .bind(input.start_date)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a task by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a workspace's tasks with optional filters, most recently
    /// created first. Excludes soft-deleted rows.
    pub async fn list_for_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        filters: &TaskFilters,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE workspace_id = $1 AND deleted_at IS NULL
               AND ($2::bigint IS NULL OR project_id = $2)
               AND ($3::bigint IS NULL OR assignee_id = $3)
               AND ($4::text IS NULL OR status = $4)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(workspace_id)
            .bind(filters.project_id)
            .bind(filters.assignee_id)
            .bind(&filters.status)
            .fetch_all(pool)
            .await
    }

    /// Update a task's editable fields. Only non-`None` fields are applied.
    /// Status is excluded -- it moves through [`TaskRepo::update_status`].
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                project_id = COALESCE($2, project_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                assignee_id = COALESCE($5, assignee_id),
                priority = COALESCE($6, priority),
                due_date = COALESCE($7, due_date),
                start_date = COALESCE($8, start_date),
                completion_pct = COALESCE($9, completion_pct),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.assignee_id)
            .bind(&input.priority)
            .bind(input.due_date)
            .bind(input.start_date)
            .bind(input.completion_pct)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a task by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE tasks SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Status transitions
    // -----------------------------------------------------------------------

    /// Transition a task to `new_status`, appending a history entry in the
    /// same transaction so the latest entry's `to_status` always equals the
    /// task's current status.
    ///
    /// First transition into `Completed` stamps `end_date`; re-entering
    /// `Completed` while `end_date` is already set leaves it untouched.
    ///
    /// Returns `None` if the task does not exist (or is soft-deleted).
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        new_status: &str,
        changed_by: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM tasks WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Task>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let stamp_end = should_stamp_end_date(new_status, current.end_date);
        let update = format!(
            "UPDATE tasks
             SET status = $2,
                 end_date = CASE WHEN $3 THEN NOW() ELSE end_date END,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Task>(&update)
            .bind(id)
            .bind(new_status)
            .bind(stamp_end)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO task_status_history (task_id, from_status, to_status, changed_by)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(id)
        .bind(&current.status)
        .bind(new_status)
        .bind(changed_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// List a task's status history, oldest first.
    pub async fn list_history(
        pool: &PgPool,
        task_id: DbId,
    ) -> Result<Vec<StatusHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM task_status_history
             WHERE task_id = $1
             ORDER BY changed_at ASC, id ASC"
        );
        sqlx::query_as::<_, StatusHistoryEntry>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Subtasks
    // -----------------------------------------------------------------------

    /// Add a subtask to a task.
    pub async fn add_subtask(
        pool: &PgPool,
        task_id: DbId,
        input: &CreateSubtask,
    ) -> Result<Subtask, sqlx::Error> {
        let query = format!(
            "INSERT INTO subtasks (task_id, title, position)
             VALUES ($1, $2, COALESCE($3, 0))
             RETURNING {SUBTASK_COLUMNS}"
        );
        sqlx::query_as::<_, Subtask>(&query)
            .bind(task_id)
            .bind(&input.title)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }

    /// List a task's subtasks in position order.
    pub async fn list_subtasks(pool: &PgPool, task_id: DbId) -> Result<Vec<Subtask>, sqlx::Error> {
        let query = format!(
            "SELECT {SUBTASK_COLUMNS} FROM subtasks
             WHERE task_id = $1
             ORDER BY position ASC, id ASC"
        );
        sqlx::query_as::<_, Subtask>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Flip a subtask's completion flag. Returns the updated row, or
    /// `None` if the subtask does not belong to the given task.
    pub async fn toggle_subtask(
        pool: &PgPool,
        task_id: DbId,
        subtask_id: DbId,
    ) -> Result<Option<Subtask>, sqlx::Error> {
        let query = format!(
            "UPDATE subtasks SET is_completed = NOT is_completed
             WHERE id = $1 AND task_id = $2
             RETURNING {SUBTASK_COLUMNS}"
        );
        sqlx::query_as::<_, Subtask>(&query)
            .bind(subtask_id)
            .bind(task_id)
            .fetch_optional(pool)
            .await
    }

    /// Recompute a task's completion percentage from its subtask counts
    /// and store it. Returns the new percentage.
    pub async fn recompute_completion(pool: &PgPool, task_id: DbId) -> Result<i16, sqlx::Error> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_completed)
             FROM subtasks WHERE task_id = $1",
        )
        .bind(task_id)
        .fetch_one(pool)
        .await?;

        let pct = ems_core::task::completion_pct(completed, total);
        sqlx::query("UPDATE tasks SET completion_pct = $2, updated_at = NOW() WHERE id = $1")
            .bind(task_id)
            .bind(pct)
            .execute(pool)
            .await?;
        Ok(pct)
    }

    // -----------------------------------------------------------------------
    // Deadline warnings
    // -----------------------------------------------------------------------

    /// List live, uncompleted tasks whose due date falls on or before
    /// `cutoff` and that have not been warned about yet.
    pub async fn list_due_for_warning(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks
             WHERE deleted_at IS NULL
               AND due_date IS NOT NULL
               AND due_date <= $1
               AND status <> 'Completed'
               AND deadline_warned_at IS NULL
             ORDER BY due_date ASC"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Mark a task as warned about its deadline.
    pub async fn set_deadline_warned(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tasks SET deadline_warned_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Recurring instances
    // -----------------------------------------------------------------------

    /// Spawn a fresh task instance from a recurring template: template
    /// fields copied, status reset, due date set to the instance's slot.
    pub async fn create_instance(
        pool: &PgPool,
        template: &Task,
        status: &str,
        due_date: Timestamp,
    ) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (workspace_id, project_id, title, description, assignee_id,
                                status, priority, due_date, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(template.workspace_id)
            .bind(template.project_id)
            .bind(&template.title)
            .bind(&template.description)
            .bind(template.assignee_id)
            .bind(status)
            .bind(&template.priority)
            .bind(due_date)
            .bind(template.created_by)
            .fetch_one(pool)
            .await
    }
}
