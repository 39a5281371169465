//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod comment;
pub mod extension_request;
pub mod notification;
pub mod project;
pub mod recurrence;
pub mod task;
pub mod time_entry;
pub mod user;
pub mod workspace;
