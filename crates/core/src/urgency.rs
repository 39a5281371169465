//! Due-date urgency classification.
//!
//! Urgency is derived from the task's due date and the current wall-clock
//! time on every read; it is never stored, so it cannot go stale.

use serde::Serialize;

use crate::types::Timestamp;

/// Hours before the due date at which a task becomes [`Urgency::Urgent`].
pub const URGENT_WINDOW_HOURS: i64 = 48;

/// Traffic-light urgency level for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// The due date has passed (or is exactly now).
    Overdue,
    /// The due date is within the next 48 hours.
    Urgent,
    /// More than 48 hours away, or no due date at all.
    Normal,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::Urgent => "urgent",
            Urgency::Normal => "normal",
        }
    }
}

/// Classify a task's urgency from its due date.
///
/// A task with no due date is always [`Urgency::Normal`]. At exactly the
/// due date the task is already overdue (diff <= 0 counts as overdue).
pub fn classify(due_date: Option<Timestamp>, now: Timestamp) -> Urgency {
    let Some(due) = due_date else {
        return Urgency::Normal;
    };

    let diff = due - now;
    if diff <= chrono::Duration::zero() {
        Urgency::Overdue
    } else if diff <= chrono::Duration::hours(URGENT_WINDOW_HOURS) {
        Urgency::Urgent
    } else {
        Urgency::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn past_due_date_is_overdue() {
        assert_eq!(classify(Some(now() - Duration::hours(1)), now()), Urgency::Overdue);
        assert_eq!(classify(Some(now() - Duration::days(30)), now()), Urgency::Overdue);
    }

    #[test]
    fn exactly_now_is_overdue() {
        assert_eq!(classify(Some(now()), now()), Urgency::Overdue);
    }

    #[test]
    fn within_window_is_urgent() {
        assert_eq!(classify(Some(now() + Duration::seconds(1)), now()), Urgency::Urgent);
        assert_eq!(classify(Some(now() + Duration::hours(24)), now()), Urgency::Urgent);
    }

    #[test]
    fn exactly_48_hours_is_urgent() {
        let due = now() + Duration::hours(URGENT_WINDOW_HOURS);
        assert_eq!(classify(Some(due), now()), Urgency::Urgent);
    }

    #[test]
    fn beyond_window_is_normal() {
        let due = now() + Duration::hours(URGENT_WINDOW_HOURS) + Duration::seconds(1);
        assert_eq!(classify(Some(due), now()), Urgency::Normal);
        assert_eq!(classify(Some(now() + Duration::days(30)), now()), Urgency::Normal);
    }

    #[test]
    fn no_due_date_is_normal() {
        assert_eq!(classify(None, now()), Urgency::Normal);
    }

    #[test]
    fn classification_is_pure() {
        let due = Some(now() + Duration::hours(12));
        assert_eq!(classify(due, now()), classify(due, now()));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Urgency::Overdue).unwrap(), "\"overdue\"");
    }
}
