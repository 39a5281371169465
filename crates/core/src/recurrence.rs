//! Recurrence patterns and next-due-date math.
//!
//! A recurrence rule lives on a template task; the worker computes the
//! next due date from `last_generated` and spawns a fresh task instance
//! once that date is reached. `last_generated` only ever moves forward.

use chrono::{Datelike, Duration, TimeZone, Timelike, Utc};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Monthly recurrences clamp the day-of-month to this value so short
/// months can never overflow. Known limitation carried over from the
/// product behaviour, not silently fixed.
pub const MONTHLY_DAY_CLAMP: u32 = 28;

/// Supported recurrence patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
    Custom,
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Monthly => "monthly",
            RecurrencePattern::Custom => "custom",
        }
    }

    /// Parse a stored pattern name.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            "custom" => Ok(RecurrencePattern::Custom),
            other => Err(CoreError::Validation(format!(
                "Unknown recurrence pattern '{other}'"
            ))),
        }
    }
}

/// A recurrence rule as stored on a task template.
#[derive(Debug, Clone)]
pub struct RecurrenceRule {
    pub pattern: RecurrencePattern,
    /// Days between instances for the `custom` pattern.
    pub interval_days: Option<i32>,
    /// Target weekday for the `weekly` pattern, 0 = Monday .. 6 = Sunday.
    pub day_of_week: Option<i16>,
    /// Target day for the `monthly` pattern, clamped to [`MONTHLY_DAY_CLAMP`].
    pub day_of_month: Option<i16>,
    /// After this instant the recurrence stops generating.
    pub end_date: Option<Timestamp>,
    /// Due date of the most recently generated instance.
    pub last_generated: Timestamp,
}

/// Whether the rule has expired (its end date lies in the past).
pub fn is_expired(rule: &RecurrenceRule, now: Timestamp) -> bool {
    rule.end_date.is_some_and(|end| now > end)
}

/// Compute the due date of the next instance after `last_generated`.
///
/// - daily: `last_generated + 1 day`
/// - weekly: the next occurrence of `day_of_week` strictly after
///   `last_generated` (a full week ahead when already on that weekday)
/// - monthly: the next calendar month at `min(day_of_month, 28)`
/// - custom: `last_generated + interval_days`
pub fn next_due(rule: &RecurrenceRule) -> Result<Timestamp, CoreError> {
    let last = rule.last_generated;

    match rule.pattern {
        RecurrencePattern::Daily => Ok(last + Duration::days(1)),

        RecurrencePattern::Weekly => {
            let target = rule.day_of_week.ok_or_else(|| {
                CoreError::Validation("Weekly recurrence requires day_of_week".to_string())
            })?;
            if !(0..=6).contains(&target) {
                return Err(CoreError::Validation(format!(
                    "day_of_week must be 0..=6 (got {target})"
                )));
            }
            let current = last.weekday().num_days_from_monday() as i64;
            let mut ahead = (target as i64 - current).rem_euclid(7);
            if ahead == 0 {
                ahead = 7;
            }
            Ok(last + Duration::days(ahead))
        }

        RecurrencePattern::Monthly => {
            let day = rule.day_of_month.ok_or_else(|| {
                CoreError::Validation("Monthly recurrence requires day_of_month".to_string())
            })?;
            if day < 1 {
                return Err(CoreError::Validation(format!(
                    "day_of_month must be positive (got {day})"
                )));
            }
            let day = (day as u32).min(MONTHLY_DAY_CLAMP);
            let (year, month) = if last.month() == 12 {
                (last.year() + 1, 1)
            } else {
                (last.year(), last.month() + 1)
            };
            Utc.with_ymd_and_hms(year, month, day, last.hour(), last.minute(), last.second())
                .single()
                .ok_or_else(|| {
                    CoreError::Internal(format!(
                        "Could not construct monthly due date {year}-{month:02}-{day:02}"
                    ))
                })
        }

        RecurrencePattern::Custom => {
            let interval = rule.interval_days.ok_or_else(|| {
                CoreError::Validation("Custom recurrence requires interval_days".to_string())
            })?;
            if interval <= 0 {
                return Err(CoreError::Validation(format!(
                    "interval_days must be positive (got {interval})"
                )));
            }
            Ok(last + Duration::days(interval as i64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ts(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn rule(pattern: RecurrencePattern, last: Timestamp) -> RecurrenceRule {
        RecurrenceRule {
            pattern,
            interval_days: None,
            day_of_week: None,
            day_of_month: None,
            end_date: None,
            last_generated: last,
        }
    }

    // -----------------------------------------------------------------------
    // Daily
    // -----------------------------------------------------------------------

    #[test]
    fn daily_advances_one_day() {
        let r = rule(RecurrencePattern::Daily, ts(2024, 1, 1));
        assert_eq!(next_due(&r).unwrap(), ts(2024, 1, 2));
    }

    // -----------------------------------------------------------------------
    // Weekly
    // -----------------------------------------------------------------------

    #[test]
    fn weekly_advances_to_target_weekday() {
        // 2024-01-01 is a Monday; target Wednesday (2).
        let mut r = rule(RecurrencePattern::Weekly, ts(2024, 1, 1));
        r.day_of_week = Some(2);
        assert_eq!(next_due(&r).unwrap(), ts(2024, 1, 3));
    }

    #[test]
    fn weekly_same_weekday_wraps_a_full_week() {
        // Monday to Monday.
        let mut r = rule(RecurrencePattern::Weekly, ts(2024, 1, 1));
        r.day_of_week = Some(0);
        assert_eq!(next_due(&r).unwrap(), ts(2024, 1, 8));
    }

    #[test]
    fn weekly_passed_weekday_wraps_forward() {
        // Wednesday 2024-01-03; target Monday (0) -> next Monday.
        let mut r = rule(RecurrencePattern::Weekly, ts(2024, 1, 3));
        r.day_of_week = Some(0);
        assert_eq!(next_due(&r).unwrap(), ts(2024, 1, 8));
    }

    #[test]
    fn weekly_without_day_of_week_is_invalid() {
        let r = rule(RecurrencePattern::Weekly, ts(2024, 1, 1));
        assert_matches!(next_due(&r), Err(CoreError::Validation(_)));
    }

    #[test]
    fn weekly_out_of_range_day_is_invalid() {
        let mut r = rule(RecurrencePattern::Weekly, ts(2024, 1, 1));
        r.day_of_week = Some(7);
        assert_matches!(next_due(&r), Err(CoreError::Validation(_)));
    }

    // -----------------------------------------------------------------------
    // Monthly
    // -----------------------------------------------------------------------

    #[test]
    fn monthly_advances_to_next_month() {
        let mut r = rule(RecurrencePattern::Monthly, ts(2024, 1, 15));
        r.day_of_month = Some(15);
        assert_eq!(next_due(&r).unwrap(), ts(2024, 2, 15));
    }

    #[test]
    fn monthly_clamps_to_day_28() {
        let mut r = rule(RecurrencePattern::Monthly, ts(2024, 1, 31));
        r.day_of_month = Some(31);
        assert_eq!(next_due(&r).unwrap(), ts(2024, 2, 28));
    }

    #[test]
    fn monthly_rolls_over_the_year() {
        let mut r = rule(RecurrencePattern::Monthly, ts(2024, 12, 10));
        r.day_of_month = Some(10);
        assert_eq!(next_due(&r).unwrap(), ts(2025, 1, 10));
    }

    #[test]
    fn monthly_preserves_time_of_day() {
        let mut r = rule(
            RecurrencePattern::Monthly,
            Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
        );
        r.day_of_month = Some(5);
        assert_eq!(
            next_due(&r).unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 5, 9, 30, 0).unwrap()
        );
    }

    #[test]
    fn monthly_without_day_of_month_is_invalid() {
        let r = rule(RecurrencePattern::Monthly, ts(2024, 1, 1));
        assert_matches!(next_due(&r), Err(CoreError::Validation(_)));
    }

    // -----------------------------------------------------------------------
    // Custom
    // -----------------------------------------------------------------------

    #[test]
    fn custom_advances_by_interval() {
        let mut r = rule(RecurrencePattern::Custom, ts(2024, 1, 1));
        r.interval_days = Some(10);
        assert_eq!(next_due(&r).unwrap(), ts(2024, 1, 11));
    }

    #[test]
    fn custom_without_interval_is_invalid() {
        let r = rule(RecurrencePattern::Custom, ts(2024, 1, 1));
        assert_matches!(next_due(&r), Err(CoreError::Validation(_)));
    }

    #[test]
    fn custom_non_positive_interval_is_invalid() {
        let mut r = rule(RecurrencePattern::Custom, ts(2024, 1, 1));
        r.interval_days = Some(0);
        assert_matches!(next_due(&r), Err(CoreError::Validation(_)));
    }

    // -----------------------------------------------------------------------
    // Expiry
    // -----------------------------------------------------------------------

    #[test]
    fn rule_with_past_end_date_is_expired() {
        let mut r = rule(RecurrencePattern::Daily, ts(2024, 1, 1));
        r.end_date = Some(ts(2024, 1, 5));
        assert!(is_expired(&r, ts(2024, 1, 6)));
    }

    #[test]
    fn rule_with_future_end_date_is_active() {
        let mut r = rule(RecurrencePattern::Daily, ts(2024, 1, 1));
        r.end_date = Some(ts(2024, 1, 5));
        assert!(!is_expired(&r, ts(2024, 1, 4)));
        assert!(!is_expired(&r, ts(2024, 1, 5)));
    }

    #[test]
    fn rule_without_end_date_never_expires() {
        let r = rule(RecurrencePattern::Daily, ts(2024, 1, 1));
        assert!(!is_expired(&r, ts(2099, 1, 1)));
    }

    // -----------------------------------------------------------------------
    // Pattern parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_known_patterns() {
        assert_eq!(
            RecurrencePattern::parse("daily").unwrap(),
            RecurrencePattern::Daily
        );
        assert_eq!(
            RecurrencePattern::parse("weekly").unwrap(),
            RecurrencePattern::Weekly
        );
        assert_eq!(
            RecurrencePattern::parse("monthly").unwrap(),
            RecurrencePattern::Monthly
        );
        assert_eq!(
            RecurrencePattern::parse("custom").unwrap(),
            RecurrencePattern::Custom
        );
    }

    #[test]
    fn rejects_unknown_pattern() {
        assert_matches!(
            RecurrencePattern::parse("yearly"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn pattern_round_trips_through_as_str() {
        for p in [
            RecurrencePattern::Daily,
            RecurrencePattern::Weekly,
            RecurrencePattern::Monthly,
            RecurrencePattern::Custom,
        ] {
            assert_eq!(RecurrencePattern::parse(p.as_str()).unwrap(), p);
        }
    }
}
