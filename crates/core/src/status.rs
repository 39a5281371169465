//! Task status vocabulary and transition rules.
//!
//! Statuses are workspace-configurable ordered string sets. The canonical
//! default is [`DEFAULT_STATUSES`]; `Completed` is the terminal name that
//! stamps a task's end date. Target statuses are validated against the
//! workspace set at the transition boundary.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Canonical default status set for new workspaces, in board order.
pub const DEFAULT_STATUSES: &[&str] =
    &["To Do", "In Progress", "In Review", "Blocked", "Completed"];

/// Terminal status name. Entering it stamps the task's end date.
pub const STATUS_COMPLETED: &str = "Completed";

/// Maximum number of statuses a workspace may configure.
pub const MAX_STATUSES: usize = 20;

/// Maximum length of a single status name in characters.
pub const MAX_STATUS_LENGTH: usize = 50;

/// Validate a workspace status set: at least one entry, no blank or
/// over-long names, no duplicates.
pub fn validate_status_set(statuses: &[String]) -> Result<(), CoreError> {
    if statuses.is_empty() {
        return Err(CoreError::Validation(
            "Workspace must have at least one status".to_string(),
        ));
    }
    if statuses.len() > MAX_STATUSES {
        return Err(CoreError::Validation(format!(
            "Workspace may have at most {MAX_STATUSES} statuses (got {})",
            statuses.len()
        )));
    }
    for status in statuses {
        if status.trim().is_empty() {
            return Err(CoreError::Validation(
                "Status names must not be blank".to_string(),
            ));
        }
        if status.len() > MAX_STATUS_LENGTH {
            return Err(CoreError::Validation(format!(
                "Status name exceeds maximum length of {MAX_STATUS_LENGTH} characters (got {})",
                status.len()
            )));
        }
    }
    for (i, status) in statuses.iter().enumerate() {
        if statuses[..i].contains(status) {
            return Err(CoreError::Validation(format!(
                "Duplicate status name: {status}"
            )));
        }
    }
    Ok(())
}

/// Validate a target status against the workspace's allowed set.
pub fn validate_target_status(new_status: &str, allowed: &[String]) -> Result<(), CoreError> {
    if allowed.iter().any(|s| s == new_status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Status '{new_status}' is not in the workspace status set ({})",
            allowed.join(", ")
        )))
    }
}

/// Whether a transition into `new_status` should stamp the task's end date.
///
/// Sticky first-completion: only the first transition into `Completed`
/// while no end date is set stamps it. Re-entering `Completed` later does
/// not move the timestamp unless the end date was cleared in between.
pub fn should_stamp_end_date(new_status: &str, end_date: Option<Timestamp>) -> bool {
    new_status == STATUS_COMPLETED && end_date.is_none()
}
