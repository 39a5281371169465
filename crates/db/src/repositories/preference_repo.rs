//! Repository for the `notification_preferences` table.

use ems_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::{NotificationPreference, UpdatePreferences};

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "user_id, email_on_mention, email_on_assignment, created_at, updated_at";

/// Provides access to per-user email preferences. A missing row means
/// every email kind is enabled.
pub struct PreferenceRepo;

impl PreferenceRepo {
    /// Get a user's preference row, if one exists.
    pub async fn get(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or update a user's preferences. Omitted fields keep their
    /// current value (or the default `true` on first insert).
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdatePreferences,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences (user_id, email_on_mention, email_on_assignment)
             VALUES ($1, COALESCE($2, true), COALESCE($3, true))
             ON CONFLICT (user_id) DO UPDATE SET
                email_on_mention = COALESCE($2, notification_preferences.email_on_mention),
                email_on_assignment = COALESCE($3, notification_preferences.email_on_assignment),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(input.email_on_mention)
            .bind(input.email_on_assignment)
            .fetch_one(pool)
            .await
    }

    /// Whether mention emails are enabled for a user (default `true`).
    pub async fn mention_email_enabled(pool: &PgPool, user_id: DbId) -> Result<bool, sqlx::Error> {
        Ok(Self::get(pool, user_id)
            .await?
            .map(|p| p.email_on_mention)
            .unwrap_or(true))
    }

    /// Whether assignment emails are enabled for a user (default `true`).
    pub async fn assignment_email_enabled(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        Ok(Self::get(pool, user_id)
            .await?
            .map(|p| p.email_on_assignment)
            .unwrap_or(true))
    }
}
