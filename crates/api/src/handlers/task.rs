//! Handlers for the `/tasks` resource: CRUD, status transitions,
//! subtasks, recurrence rules, and time entries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use ems_core::error::CoreError;
use ems_core::notification::KIND_INFO;
use ems_core::status::validate_target_status;
use ems_core::task::{validate_priority, validate_title};
use ems_core::types::{DbId, Timestamp};
use ems_core::urgency::{classify, Urgency};
use ems_db::models::recurrence::{TaskRecurrence, UpsertRecurrence};
use ems_db::models::task::{CreateSubtask, CreateTask, StatusHistoryEntry, Subtask, Task, UpdateTask};
use ems_db::models::time_entry::{CreateTimeEntry, TimeEntry};
use ems_db::repositories::task_repo::TaskFilters;
use ems_db::repositories::{
    NotificationRepo, RecurrenceRepo, TaskRepo, TimeEntryRepo, UserRepo, WorkspaceRepo,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::require_member;
use crate::middleware::auth::AuthUser;
use crate::notifications::links::entity_link;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /tasks`.
#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub workspace_id: DbId,
    pub project_id: Option<DbId>,
    pub assignee_id: Option<DbId>,
    pub status: Option<String>,
}

/// A task with its urgency computed from the current wall clock.
#[derive(Debug, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub urgency: Urgency,
}

impl TaskView {
    fn now(task: Task) -> Self {
        let urgency = classify(task.due_date, Utc::now());
        Self { task, urgency }
    }
}

/// Full task detail: subtasks, status history, and logged time.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: TaskView,
    pub subtasks: Vec<Subtask>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub total_logged_secs: i64,
}

/// Request body for `POST /tasks/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks
///
/// Create a task. Assigning it to someone else notifies them in-app and,
/// preferences permitting, by email.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<TaskView>)> {
    require_member(&state.pool, input.workspace_id, auth.user_id).await?;
    validate_title(&input.title)?;
    if let Some(priority) = &input.priority {
        validate_priority(priority)?;
    }
    if let Some(status) = &input.status {
        let workspace = load_workspace(&state, input.workspace_id).await?;
        validate_target_status(status, &workspace.status_names())?;
    }

    let task = TaskRepo::create(&state.pool, &input, auth.user_id).await?;

    if let Some(assignee_id) = task.assignee_id {
        if assignee_id != auth.user_id {
            notify_assignment(&state, &task, assignee_id, auth.user_id).await;
        }
    }

    Ok((StatusCode::CREATED, Json(TaskView::now(task))))
}

/// GET /api/v1/tasks?workspace_id={id}
///
/// List tasks with optional project/assignee/status filters. Urgency is
/// recomputed per task on every read.
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskQuery>,
) -> AppResult<Json<Vec<TaskView>>> {
    require_member(&state.pool, params.workspace_id, auth.user_id).await?;

    let filters = TaskFilters {
        project_id: params.project_id,
        assignee_id: params.assignee_id,
        status: params.status,
    };
    let tasks = TaskRepo::list_for_workspace(&state.pool, params.workspace_id, &filters).await?;
    Ok(Json(tasks.into_iter().map(TaskView::now).collect()))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskDetail>> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let subtasks = TaskRepo::list_subtasks(&state.pool, id).await?;
    let status_history = TaskRepo::list_history(&state.pool, id).await?;
    let total_logged_secs = TimeEntryRepo::total_secs_for_task(&state.pool, id).await?;

    Ok(Json(TaskDetail {
        task: TaskView::now(task),
        subtasks,
        status_history,
        total_logged_secs,
    }))
}

/// PUT /api/v1/tasks/{id}
///
/// Update editable fields. A changed assignee is notified. Status is not
/// accepted here -- use the status endpoint so history stays append-only.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<TaskView>> {
    let before = load_task(&state, id).await?;
    require_member(&state.pool, before.workspace_id, auth.user_id).await?;

    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(priority) = &input.priority {
        validate_priority(priority)?;
    }

    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    if let Some(assignee_id) = task.assignee_id {
        if before.assignee_id != Some(assignee_id) && assignee_id != auth.user_id {
            notify_assignment(&state, &task, assignee_id, auth.user_id).await;
        }
    }

    Ok(Json(TaskView::now(task)))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let deleted = TaskRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Task", id }))
    }
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/status
///
/// Transition the task to a new status. The target must belong to the
/// workspace's status set; the change appends to the append-only history
/// and the first entry into `Completed` stamps `end_date`.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<TaskView>> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let workspace = load_workspace(&state, task.workspace_id).await?;
    validate_target_status(&input.status, &workspace.status_names())?;

    let updated = TaskRepo::update_status(&state.pool, id, &input.status, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    tracing::info!(
        task_id = id,
        from = %task.status,
        to = %updated.status,
        by = auth.user_id,
        "Task status changed"
    );
    Ok(Json(TaskView::now(updated)))
}

// ---------------------------------------------------------------------------
// Subtasks
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/subtasks
pub async fn add_subtask(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateSubtask>,
) -> AppResult<(StatusCode, Json<Subtask>)> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Subtask title must not be empty".into(),
        )));
    }

    let subtask = TaskRepo::add_subtask(&state.pool, id, &input).await?;
    TaskRepo::recompute_completion(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(subtask)))
}

/// POST /api/v1/tasks/{id}/subtasks/{subtask_id}/toggle
///
/// Flip a subtask's completion flag and recompute the task's derived
/// completion percentage.
pub async fn toggle_subtask(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, subtask_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Subtask>> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let subtask = TaskRepo::toggle_subtask(&state.pool, id, subtask_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subtask",
            id: subtask_id,
        }))?;
    TaskRepo::recompute_completion(&state.pool, id).await?;
    Ok(Json(subtask))
}

// ---------------------------------------------------------------------------
// Recurrence
// ---------------------------------------------------------------------------

/// PUT /api/v1/tasks/{id}/recurrence
///
/// Create or replace the task's recurrence rule. The rule is validated by
/// computing its first due date before anything is stored.
pub async fn upsert_recurrence(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpsertRecurrence>,
) -> AppResult<Json<TaskRecurrence>> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let now = Utc::now();
    validate_rule(&input, now)?;

    let recurrence = RecurrenceRepo::upsert(&state.pool, id, &input, now).await?;
    Ok(Json(recurrence))
}

/// GET /api/v1/tasks/{id}/recurrence
pub async fn get_recurrence(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskRecurrence>> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let recurrence = RecurrenceRepo::find_for_task(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Recurrence",
            id,
        }))?;
    Ok(Json(recurrence))
}

/// DELETE /api/v1/tasks/{id}/recurrence
///
/// Stop the task's recurrence. The rule row is kept for audit; only
/// `is_active` flips.
pub async fn stop_recurrence(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let stopped = RecurrenceRepo::deactivate(&state.pool, id).await?;
    if stopped {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Recurrence",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Time entries
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/time-entries
pub async fn log_time(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTimeEntry>,
) -> AppResult<(StatusCode, Json<TimeEntry>)> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    if input.duration_secs <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Duration must be positive".into(),
        )));
    }

    let entry = TimeEntryRepo::create(&state.pool, id, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/v1/tasks/{id}/time-entries
pub async fn list_time_entries(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<TimeEntry>>> {
    let task = load_task(&state, id).await?;
    require_member(&state.pool, task.workspace_id, auth.user_id).await?;

    let entries = TimeEntryRepo::list_for_task(&state.pool, id).await?;
    Ok(Json(entries))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a live task or produce a not-found error.
async fn load_task(state: &AppState, id: DbId) -> Result<Task, AppError> {
    TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))
}

/// Load a workspace or produce a not-found error.
async fn load_workspace(
    state: &AppState,
    id: DbId,
) -> Result<ems_db::models::workspace::Workspace, AppError> {
    WorkspaceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workspace",
            id,
        }))
}

/// Validate a recurrence rule by computing its first due date.
fn validate_rule(input: &UpsertRecurrence, now: Timestamp) -> Result<(), AppError> {
    let rule = ems_core::recurrence::RecurrenceRule {
        pattern: ems_core::recurrence::RecurrencePattern::parse(&input.pattern)?,
        interval_days: input.interval_days,
        day_of_week: input.day_of_week,
        day_of_month: input.day_of_month,
        end_date: input.end_date,
        last_generated: input.start_from.unwrap_or(now),
    };
    ems_core::recurrence::next_due(&rule)?;
    Ok(())
}

/// Store the assignment notification and publish the email event.
/// Failures are logged and swallowed -- assignment itself already
/// succeeded.
async fn notify_assignment(state: &AppState, task: &Task, assignee_id: DbId, actor_id: DbId) {
    let link = entity_link(&state.config.app_base_url, "task");
    let message = format!("You were assigned \"{}\"", task.title);

    if let Err(e) = NotificationRepo::create(
        &state.pool,
        assignee_id,
        "Task assigned",
        &message,
        KIND_INFO,
        Some(&link),
    )
    .await
    {
        tracing::error!(task_id = task.id, error = %e, "Failed to store assignment notification");
        return;
    }

    let assignee = match UserRepo::find_by_id(&state.pool, assignee_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return,
        Err(e) => {
            tracing::error!(assignee_id, error = %e, "Failed to load assignee for email");
            return;
        }
    };

    state.event_bus.publish(
        ems_events::DomainEvent::new(ems_events::event_types::TASK_ASSIGNED)
            .with_source("task", task.id)
            .with_actor(actor_id)
            .with_payload(serde_json::json!({
                "recipient_id": assignee.id,
                "recipient_email": assignee.email,
                "task_title": task.title,
                "link": link,
            })),
    );
}
