//! Periodic deadline check.
//!
//! Spawns a background task that scans for live, uncompleted tasks whose
//! due date has entered the urgent window (or passed) and creates a
//! one-time warning notification for the assignee. `deadline_warned_at`
//! marks tasks that were already warned. Runs on a fixed interval using
//! `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use ems_core::notification::KIND_WARNING;
use ems_core::urgency::{classify, Urgency, URGENT_WINDOW_HOURS};
use ems_db::repositories::{NotificationRepo, TaskRepo};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use crate::notifications::links::entity_link;

/// Default check interval in seconds (1 hour).
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 3600;

/// Run the deadline check loop.
///
/// The interval can be overridden with `DEADLINE_CHECK_INTERVAL_SECS`.
/// Runs until `cancel` is triggered.
pub async fn run(pool: PgPool, base_url: String, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("DEADLINE_CHECK_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CHECK_INTERVAL_SECS);

    tracing::info!(interval_secs, "Deadline check job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Deadline check job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep(&pool, &base_url).await {
                    Ok(warned) => {
                        if warned > 0 {
                            tracing::info!(warned, "Deadline check: warnings created");
                        } else {
                            tracing::debug!("Deadline check: nothing due");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Deadline check sweep failed");
                    }
                }
            }
        }
    }
}

/// One pass: warn about every task newly inside the urgent window.
async fn sweep(pool: &PgPool, base_url: &str) -> Result<usize, sqlx::Error> {
    let now = Utc::now();
    let cutoff = now + chrono::Duration::hours(URGENT_WINDOW_HOURS);
    let due = TaskRepo::list_due_for_warning(pool, cutoff).await?;

    let link = entity_link(base_url, "task");
    let mut warned = 0;

    for task in due {
        // Unassigned tasks have nobody to warn; skip without marking so
        // a later assignee still gets the warning.
        let Some(assignee_id) = task.assignee_id else {
            continue;
        };

        let (title, message) = match classify(task.due_date, now) {
            Urgency::Overdue => (
                "Task overdue",
                format!("\"{}\" is past its due date", task.title),
            ),
            Urgency::Urgent => (
                "Deadline approaching",
                format!("\"{}\" is due within {URGENT_WINDOW_HOURS} hours", task.title),
            ),
            Urgency::Normal => continue,
        };

        NotificationRepo::create(pool, assignee_id, title, &message, KIND_WARNING, Some(&link))
            .await?;
        TaskRepo::set_deadline_warned(pool, task.id).await?;
        warned += 1;
    }

    Ok(warned)
}
