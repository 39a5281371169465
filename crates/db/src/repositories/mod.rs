//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod extension_repo;
pub mod notification_repo;
pub mod preference_repo;
pub mod project_repo;
pub mod recurrence_repo;
pub mod task_repo;
pub mod time_entry_repo;
pub mod user_repo;
pub mod workspace_repo;

pub use comment_repo::CommentRepo;
pub use extension_repo::ExtensionRepo;
pub use notification_repo::NotificationRepo;
pub use preference_repo::PreferenceRepo;
pub use project_repo::ProjectRepo;
pub use recurrence_repo::RecurrenceRepo;
pub use task_repo::TaskRepo;
pub use time_entry_repo::TimeEntryRepo;
pub use user_repo::UserRepo;
pub use workspace_repo::WorkspaceRepo;
