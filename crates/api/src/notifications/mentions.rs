//! The mention notifier: parse, resolve, fan out.
//!
//! Triggered once per comment submission. Parsing and recipient
//! resolution are pure (`ems_core::mention`); this service does the IO:
//! member lookup, guaranteed in-app notification rows, and publishing
//! email events for the best-effort channel.

use std::sync::Arc;

use ems_core::mention::{parse_mentions, resolve_recipients, MentionTarget};
use ems_core::notification::KIND_MENTION;
use ems_core::types::DbId;
use ems_db::repositories::{NotificationRepo, WorkspaceRepo};
use ems_db::DbPool;
use ems_events::{event_types, DomainEvent, EventBus};

use crate::notifications::links::entity_link;
use crate::state::AppState;

/// Title of every mention notification.
const MENTION_TITLE: &str = "Mentioned";

/// Fans out mention notifications for one piece of submitted text.
pub struct MentionNotifier {
    pool: DbPool,
    bus: Arc<EventBus>,
    base_url: String,
}

impl MentionNotifier {
    /// Build a notifier from the shared application state.
    pub fn from_state(state: &AppState) -> Self {
        Self {
            pool: state.pool.clone(),
            bus: Arc::clone(&state.event_bus),
            base_url: state.config.app_base_url.clone(),
        }
    }

    /// Scan `text` for mentions and notify every resolved recipient.
    ///
    /// Unmatched names are dropped silently, recipients are deduplicated,
    /// and the author never gets a self-mention. Per-recipient failures
    /// are logged and skipped so one bad row cannot block the rest; only
    /// the member-list lookup itself can fail the call.
    ///
    /// Returns the number of recipients notified in-app.
    #[allow(clippy::too_many_arguments)]
    pub async fn handle_mentions(
        &self,
        text: &str,
        author_id: DbId,
        author_email: &str,
        author_name: &str,
        entity_type: &str,
        entity_id: DbId,
        workspace_id: DbId,
    ) -> Result<usize, sqlx::Error> {
        let tokens = parse_mentions(text);
        if tokens.is_empty() {
            return Ok(0);
        }

        let members = WorkspaceRepo::list_members(&self.pool, workspace_id).await?;
        let targets: Vec<MentionTarget> = members
            .iter()
            .map(|m| MentionTarget {
                name: m.display_name.clone(),
                email: m.email.clone(),
            })
            .collect();

        let recipients = resolve_recipients(&tokens, &targets, author_email);
        if recipients.is_empty() {
            return Ok(0);
        }

        let link = entity_link(&self.base_url, entity_type);
        let message = format!("{author_name} mentioned you in a {entity_type} comment");

        let mut notified = 0;
        for email in recipients {
            // Bare-email mentions can address someone outside the
            // workspace; only members get an inbox.
            let Some(member) = members
                .iter()
                .find(|m| m.email.eq_ignore_ascii_case(&email))
            else {
                tracing::debug!(recipient = %email, "Mentioned address is not a workspace member");
                continue;
            };

            match NotificationRepo::create(
                &self.pool,
                member.user_id,
                MENTION_TITLE,
                &message,
                KIND_MENTION,
                Some(&link),
            )
            .await
            {
                Ok(_) => notified += 1,
                Err(e) => {
                    tracing::error!(
                        recipient = %email,
                        error = %e,
                        "Failed to store mention notification"
                    );
                    continue;
                }
            }

            self.bus.publish(
                DomainEvent::new(event_types::COMMENT_MENTION)
                    .with_source(entity_type, entity_id)
                    .with_actor(author_id)
                    .with_payload(serde_json::json!({
                        "recipient_id": member.user_id,
                        "recipient_email": member.email,
                        "author_name": author_name,
                        "comment_text": text,
                        "link": link,
                    })),
            );
        }

        Ok(notified)
    }
}
