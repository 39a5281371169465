//! Notification services for the request path.
//!
//! The in-app notification row is the guaranteed channel and is written
//! synchronously; email is published to the event bus and delivered
//! best-effort by `ems_events::EmailFanout`.

pub mod links;
pub mod mentions;

pub use mentions::MentionNotifier;
