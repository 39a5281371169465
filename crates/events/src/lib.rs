//! DreamShift EMS event bus and notification infrastructure.
//!
//! Building blocks for the notification fan-out:
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`] -- the canonical domain event envelope.
//! - [`delivery`] -- the outbound email capability ([`Mailer`]) with SMTP
//!   and no-op implementations.
//! - [`templates`] -- email subject/body rendering (escaped, truncated
//!   comment previews).
//! - [`EmailFanout`] -- background consumer that turns bus events into
//!   best-effort emails. In-app notification rows are written by the
//!   request path before the event is published; email never blocks it.

pub mod bus;
pub mod delivery;
pub mod fanout;
pub mod templates;

pub use bus::{event_types, DomainEvent, EventBus};
pub use delivery::email::{EmailConfig, MailError, Mailer, NoopMailer, SmtpMailer};
pub use fanout::EmailFanout;
