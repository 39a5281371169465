//! One pass of the recurring-task generator.
//!
//! For every active recurrence rule: expired rules are deactivated;
//! rules whose next due date has arrived spawn one fresh task instance
//! and advance `last_generated`. The advance is a conditional update, so
//! an overlapping run generates nothing twice. Per-rule failures are
//! collected and never abort the rest of the sweep.

use std::fmt;

use ems_core::recurrence::{is_expired, next_due};
use ems_core::types::Timestamp;
use ems_db::models::recurrence::TaskRecurrence;
use ems_db::repositories::{RecurrenceRepo, TaskRepo, WorkspaceRepo};
use sqlx::PgPool;

/// Fallback status for spawned instances when the workspace vocabulary
/// cannot be read.
const FALLBACK_STATUS: &str = "To Do";

/// Outcome of one sweep over all active recurrences.
#[derive(Debug, Default)]
pub struct SweepSummary {
    /// Rules examined.
    pub processed: usize,
    /// Fresh task instances created.
    pub generated: usize,
    /// Rules that failed; the sweep continued past them.
    pub errored: usize,
    /// One message per failed rule.
    pub errors: Vec<String>,
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Recurring sweep: processed {}, generated {}, errored {}",
            self.processed, self.generated, self.errored
        )?;
        for error in &self.errors {
            writeln!(f, "  error: {error}")?;
        }
        Ok(())
    }
}

/// Run one sweep at the given wall-clock instant.
///
/// Only the initial rule listing can fail the sweep itself; everything
/// per-rule is caught and reported through the summary.
pub async fn run_sweep(pool: &PgPool, now: Timestamp) -> Result<SweepSummary, sqlx::Error> {
    let rules = RecurrenceRepo::list_active(pool).await?;
    let mut summary = SweepSummary::default();

    for rule in rules {
        summary.processed += 1;
        match process_rule(pool, &rule, now).await {
            Ok(true) => summary.generated += 1,
            Ok(false) => {}
            Err(message) => {
                tracing::error!(task_id = rule.task_id, error = %message, "Recurrence failed");
                summary.errored += 1;
                summary.errors.push(message);
            }
        }
    }

    Ok(summary)
}

/// Process one rule. Returns `Ok(true)` when an instance was generated.
async fn process_rule(
    pool: &PgPool,
    stored: &TaskRecurrence,
    now: Timestamp,
) -> Result<bool, String> {
    let template = TaskRepo::find_by_id(pool, stored.task_id)
        .await
        .map_err(|e| format!("task {}: {e}", stored.task_id))?
        .ok_or_else(|| format!("task {}: template task no longer exists", stored.task_id))?;

    let rule = stored
        .to_rule()
        .map_err(|e| format!("{}: {e}", template.title))?;

    if is_expired(&rule, now) {
        RecurrenceRepo::deactivate(pool, stored.task_id)
            .await
            .map_err(|e| format!("{}: {e}", template.title))?;
        tracing::info!(task_id = stored.task_id, title = %template.title, "Recurrence expired, stopped");
        return Ok(false);
    }

    let due = next_due(&rule).map_err(|e| format!("{}: {e}", template.title))?;
    if now < due {
        return Ok(false);
    }

    // Advance first: the conditional update is the idempotency guard.
    // If another run already moved last_generated, this matches nothing
    // and we must not generate.
    let advanced =
        RecurrenceRepo::advance_last_generated(pool, stored.task_id, stored.last_generated, due)
            .await
            .map_err(|e| format!("{}: {e}", template.title))?;
    if !advanced {
        tracing::debug!(
            task_id = stored.task_id,
            "last_generated already advanced, skipping generation"
        );
        return Ok(false);
    }

    let status = WorkspaceRepo::find_by_id(pool, template.workspace_id)
        .await
        .map_err(|e| format!("{}: {e}", template.title))?
        .and_then(|ws| ws.status_names().first().cloned())
        .unwrap_or_else(|| FALLBACK_STATUS.to_string());

    let instance = TaskRepo::create_instance(pool, &template, &status, due)
        .await
        .map_err(|e| format!("{}: {e}", template.title))?;

    tracing::info!(
        template_id = template.id,
        instance_id = instance.id,
        due = %due,
        "Generated recurring task instance"
    );
    Ok(true)
}
