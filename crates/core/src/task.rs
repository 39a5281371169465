//! Task field validation and subtask-derived progress.

use crate::error::CoreError;

/// Maximum length for a task title in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a task description in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Known priority names, lowest to highest.
pub mod priorities {
    pub const LOW: &str = "Low";
    pub const NORMAL: &str = "Normal";
    pub const HIGH: &str = "High";
    pub const URGENT: &str = "Urgent";
}

/// The set of all valid task priorities.
pub const VALID_PRIORITIES: &[&str] = &[
    priorities::LOW,
    priorities::NORMAL,
    priorities::HIGH,
    priorities::URGENT,
];

/// Returns `true` if the given priority name is valid.
pub fn is_valid_priority(priority: &str) -> bool {
    VALID_PRIORITIES.contains(&priority)
}

/// Validate a task title: must be non-blank and within the length limit.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Task title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Task title exceeds maximum length of {MAX_TITLE_LENGTH} characters (got {})",
            title.len()
        )));
    }
    Ok(())
}

/// Validate a priority name.
pub fn validate_priority(priority: &str) -> Result<(), CoreError> {
    if is_valid_priority(priority) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid priority '{priority}'. Must be one of: {}",
            VALID_PRIORITIES.join(", ")
        )))
    }
}

/// Completion percentage derived from subtask counts.
///
/// A task with no subtasks derives 0; callers keep a manually-set
/// percentage instead in that case.
pub fn completion_pct(completed: i64, total: i64) -> i16 {
    if total <= 0 {
        return 0;
    }
    ((completed.clamp(0, total) * 100) / total) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_title_accepted() {
        assert!(validate_title("Ship the onboarding flow").is_ok());
    }

    #[test]
    fn empty_title_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn over_long_title_rejected() {
        let title = "x".repeat(MAX_TITLE_LENGTH + 1);
        assert!(validate_title(&title).is_err());
    }

    #[test]
    fn title_at_limit_accepted() {
        let title = "x".repeat(MAX_TITLE_LENGTH);
        assert!(validate_title(&title).is_ok());
    }

    #[test]
    fn known_priorities_valid() {
        for p in VALID_PRIORITIES {
            assert!(validate_priority(p).is_ok());
        }
    }

    #[test]
    fn unknown_priority_rejected() {
        assert!(validate_priority("Critical").is_err());
        assert!(validate_priority("low").is_err());
    }

    #[test]
    fn completion_pct_basic() {
        assert_eq!(completion_pct(0, 4), 0);
        assert_eq!(completion_pct(1, 4), 25);
        assert_eq!(completion_pct(4, 4), 100);
    }

    #[test]
    fn completion_pct_truncates() {
        assert_eq!(completion_pct(1, 3), 33);
        assert_eq!(completion_pct(2, 3), 66);
    }

    #[test]
    fn completion_pct_no_subtasks_is_zero() {
        assert_eq!(completion_pct(0, 0), 0);
    }

    #[test]
    fn completion_pct_clamps_out_of_range_counts() {
        assert_eq!(completion_pct(5, 4), 100);
        assert_eq!(completion_pct(-1, 4), 0);
    }
}
