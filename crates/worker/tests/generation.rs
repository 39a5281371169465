//! Integration tests for the recurring-task sweep against a real
//! database.

use chrono::{TimeZone, Utc};
use ems_db::models::recurrence::UpsertRecurrence;
use ems_db::models::task::CreateTask;
use ems_db::repositories::task_repo::TaskFilters;
use ems_db::repositories::{RecurrenceRepo, TaskRepo, UserRepo, WorkspaceRepo};
use ems_worker::sweep::run_sweep;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_template(pool: &PgPool, title: &str) -> (i64, i64) {
    // Derive a unique email per template so tests can seed several.
    let slug: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    let user = UserRepo::create(pool, &format!("{slug}@example.com"), "Cron", "$argon2id$fake-hash")
        .await
        .unwrap()
        .id;
    let statuses = serde_json::json!(ems_core::status::DEFAULT_STATUSES);
    let ws = WorkspaceRepo::create(pool, "Recurring WS", user, &statuses)
        .await
        .unwrap()
        .id;
    let task = TaskRepo::create(
        pool,
        &CreateTask {
            workspace_id: ws,
            project_id: None,
            title: title.to_string(),
            description: Some("template".to_string()),
            assignee_id: None,
            status: None,
            priority: None,
            due_date: None,
            start_date: None,
        },
        user,
    )
    .await
    .unwrap();
    (ws, task.id)
}

fn daily_rule(start_from: chrono::DateTime<Utc>) -> UpsertRecurrence {
    UpsertRecurrence {
        pattern: "daily".to_string(),
        interval_days: None,
        day_of_week: None,
        day_of_month: None,
        end_date: None,
        start_from: Some(start_from),
    }
}

// ---------------------------------------------------------------------------
// Test: daily rule generates exactly one instance and advances
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_daily_generates_once_and_advances(pool: PgPool) {
    let (ws, template_id) = seed_template(&pool, "Daily standup notes").await;

    let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    RecurrenceRepo::upsert(&pool, template_id, &daily_rule(last), last)
        .await
        .unwrap();

    // One second past the next due date.
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 1).unwrap();
    let summary = run_sweep(&pool, now).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.errored, 0);

    // Exactly one new instance with the computed due date.
    let tasks = TaskRepo::list_for_workspace(&pool, ws, &TaskFilters::default())
        .await
        .unwrap();
    assert_eq!(tasks.len(), 2, "template + one instance");
    let instance = tasks
        .iter()
        .find(|t| t.id != template_id)
        .expect("instance exists");
    assert_eq!(instance.title, "Daily standup notes");
    assert_eq!(
        instance.due_date,
        Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
    );
    assert_eq!(instance.status, "To Do", "status resets on the instance");

    // last_generated advanced to the instance's due date.
    let rule = RecurrenceRepo::find_for_task(&pool, template_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        rule.last_generated,
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
    );

    // A second sweep at the same instant finds nothing due.
    let summary = run_sweep(&pool, now).await.unwrap();
    assert_eq!(summary.generated, 0, "same-day rerun must not double-generate");
    let tasks = TaskRepo::list_for_workspace(&pool, ws, &TaskFilters::default())
        .await
        .unwrap();
    assert_eq!(tasks.len(), 2);
}

// ---------------------------------------------------------------------------
// Test: rule not yet due generates nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_not_yet_due_generates_nothing(pool: PgPool) {
    let (ws, template_id) = seed_template(&pool, "Weekly review").await;

    let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    RecurrenceRepo::upsert(&pool, template_id, &daily_rule(last), last)
        .await
        .unwrap();

    // Still inside the current period.
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let summary = run_sweep(&pool, now).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.generated, 0);

    let tasks = TaskRepo::list_for_workspace(&pool, ws, &TaskFilters::default())
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1, "only the template");
}

// ---------------------------------------------------------------------------
// Test: expired rule is deactivated and generates nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_expired_rule_is_stopped(pool: PgPool) {
    let (ws, template_id) = seed_template(&pool, "Sunsetting chore").await;

    let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut rule = daily_rule(last);
    rule.end_date = Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
    RecurrenceRepo::upsert(&pool, template_id, &rule, last).await.unwrap();

    // Well past the end date.
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let summary = run_sweep(&pool, now).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.generated, 0);
    assert_eq!(summary.errored, 0);

    let stored = RecurrenceRepo::find_for_task(&pool, template_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_active, "expired recurrence must be deactivated");

    let tasks = TaskRepo::list_for_workspace(&pool, ws, &TaskFilters::default())
        .await
        .unwrap();
    assert_eq!(tasks.len(), 1, "no instances from an expired rule");

    // The stopped rule is invisible to the next sweep.
    let summary = run_sweep(&pool, now).await.unwrap();
    assert_eq!(summary.processed, 0);
}

// ---------------------------------------------------------------------------
// Test: a broken rule errors in isolation, healthy rules still run
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_per_rule_errors_do_not_abort_sweep(pool: PgPool) {
    let (_, healthy_id) = seed_template(&pool, "Healthy daily").await;
    let (_, broken_id) = seed_template(&pool, "Broken custom").await;

    let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    RecurrenceRepo::upsert(&pool, healthy_id, &daily_rule(last), last)
        .await
        .unwrap();
    // Custom pattern without interval_days is malformed.
    RecurrenceRepo::upsert(
        &pool,
        broken_id,
        &UpsertRecurrence {
            pattern: "custom".to_string(),
            interval_days: None,
            day_of_week: None,
            day_of_month: None,
            end_date: None,
            start_from: Some(last),
        },
        last,
    )
    .await
    .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
    let summary = run_sweep(&pool, now).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.generated, 1, "healthy rule still generated");
    assert_eq!(summary.errored, 1);
    assert!(
        summary.errors[0].contains("Broken custom"),
        "error message names the task title, got: {}",
        summary.errors[0]
    );
}

// ---------------------------------------------------------------------------
// Test: concurrent-run guard skips when last_generated moved
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_advance_guard_is_conditional(pool: PgPool) {
    let (_, template_id) = seed_template(&pool, "Guarded").await;

    let last = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    RecurrenceRepo::upsert(&pool, template_id, &daily_rule(last), last)
        .await
        .unwrap();

    let next = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    // First advance wins.
    assert!(
        RecurrenceRepo::advance_last_generated(&pool, template_id, last, next)
            .await
            .unwrap()
    );
    // A second run holding the stale previous value loses.
    assert!(
        !RecurrenceRepo::advance_last_generated(&pool, template_id, last, next)
            .await
            .unwrap()
    );
}
