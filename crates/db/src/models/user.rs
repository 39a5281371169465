//! User entity models and DTOs.

use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new user. The plaintext password is hashed
/// before it reaches the repository.
#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub display_name: String,
    pub password: String,
}
