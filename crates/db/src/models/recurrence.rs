//! Task recurrence entity models and DTOs.

use ems_core::error::CoreError;
use ems_core::recurrence::{RecurrencePattern, RecurrenceRule};
use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `task_recurrences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskRecurrence {
    pub task_id: DbId,
    pub pattern: String,
    pub interval_days: Option<i32>,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub end_date: Option<Timestamp>,
    pub last_generated: Timestamp,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TaskRecurrence {
    /// Convert the stored row into the domain rule for date math.
    pub fn to_rule(&self) -> Result<RecurrenceRule, CoreError> {
        Ok(RecurrenceRule {
            pattern: RecurrencePattern::parse(&self.pattern)?,
            interval_days: self.interval_days,
            day_of_week: self.day_of_week,
            day_of_month: self.day_of_month,
            end_date: self.end_date,
            last_generated: self.last_generated,
        })
    }
}

/// DTO for creating or replacing a task's recurrence rule.
///
/// `start_from` seeds `last_generated`; when omitted the repository uses
/// the current time, so the first instance is due one period from now.
#[derive(Debug, Deserialize)]
pub struct UpsertRecurrence {
    pub pattern: String,
    pub interval_days: Option<i32>,
    pub day_of_week: Option<i16>,
    pub day_of_month: Option<i16>,
    pub end_date: Option<Timestamp>,
    pub start_from: Option<Timestamp>,
}
