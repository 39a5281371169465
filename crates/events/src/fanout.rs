//! Event-to-email fan-out.
//!
//! [`EmailFanout`] subscribes to the event bus and turns mention,
//! assignment, and extension events into best-effort emails. The in-app
//! notification row was already written by the request path, so every
//! failure here is logged and swallowed -- email must never block or fail
//! a request.

use std::sync::Arc;

use ems_db::repositories::PreferenceRepo;
use ems_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::{event_types, DomainEvent};
use crate::delivery::email::Mailer;
use crate::templates;

/// Routes domain events to outbound email.
pub struct EmailFanout {
    pool: DbPool,
    mailer: Arc<dyn Mailer>,
}

impl EmailFanout {
    /// Create a new fan-out with the given database pool and mailer.
    pub fn new(pool: DbPool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Run the main delivery loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DomainEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.deliver(&event).await {
                        tracing::warn!(
                            error = %e,
                            event_type = %event.event_type,
                            "Email delivery failed, dropping (in-app notification already stored)"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Email fan-out lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, email fan-out shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver a single event, honouring the recipient's preferences.
    async fn deliver(&self, event: &DomainEvent) -> Result<(), FanoutError> {
        let Some(recipient_id) = event.payload_id("recipient_id") else {
            return Ok(());
        };
        let Some(recipient_email) = event.payload_str("recipient_email") else {
            return Ok(());
        };
        let link = event.payload_str("link").unwrap_or("/");

        let (allowed, subject, body) = match event.event_type.as_str() {
            event_types::COMMENT_MENTION => {
                let allowed =
                    PreferenceRepo::mention_email_enabled(&self.pool, recipient_id).await?;
                let author = event.payload_str("author_name").unwrap_or("Someone");
                let preview = event.payload_str("comment_text").unwrap_or("");
                let (subject, body) = templates::mention_email(author, preview, link);
                (allowed, subject, body)
            }
            event_types::TASK_ASSIGNED => {
                let allowed =
                    PreferenceRepo::assignment_email_enabled(&self.pool, recipient_id).await?;
                let title = event.payload_str("task_title").unwrap_or("a task");
                let (subject, body) = templates::assignment_email(title, link);
                (allowed, subject, body)
            }
            event_types::EXTENSION_REQUESTED => {
                let allowed =
                    PreferenceRepo::assignment_email_enabled(&self.pool, recipient_id).await?;
                let requester = event.payload_str("requester_name").unwrap_or("A member");
                let title = event.payload_str("task_title").unwrap_or("a task");
                let (subject, body) = templates::extension_email(requester, title, link);
                (allowed, subject, body)
            }
            // Other event types have no email channel.
            _ => return Ok(()),
        };

        if !allowed {
            tracing::debug!(
                recipient = recipient_email,
                event_type = %event.event_type,
                "Recipient has emails disabled for this event type"
            );
            return Ok(());
        }

        self.mailer.send(recipient_email, &subject, &body).await?;
        Ok(())
    }
}

/// Internal error type for a single delivery attempt.
#[derive(Debug, thiserror::Error)]
enum FanoutError {
    #[error("preference lookup failed: {0}")]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Mail(#[from] crate::delivery::email::MailError),
}
