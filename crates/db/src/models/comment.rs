//! Comment entity models and DTOs.

use ems_core::comment::DELETED_PLACEHOLDER;
use ems_core::threading::Threadable;
use ems_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `comments` table.
///
/// Soft-deleted rows keep their stored body (tombstone) but serialize the
/// placeholder instead, so the original text never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub author_id: DbId,
    pub body: String,
    pub is_deleted: bool,
    pub is_pinned: bool,
    pub parent_comment_id: Option<DbId>,
    /// Emoji -> array of reacting user ids.
    pub reactions: serde_json::Value,
    pub created_at: Timestamp,
    pub edited_at: Option<Timestamp>,
}

impl Comment {
    /// The body to render: the placeholder for deleted comments, for
    /// every viewer including the author.
    pub fn display_body(&self) -> &str {
        if self.is_deleted {
            DELETED_PLACEHOLDER
        } else {
            &self.body
        }
    }
}

impl Serialize for Comment {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Comment", 11)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("entity_type", &self.entity_type)?;
        state.serialize_field("entity_id", &self.entity_id)?;
        state.serialize_field("author_id", &self.author_id)?;
        state.serialize_field("body", self.display_body())?;
        state.serialize_field("is_deleted", &self.is_deleted)?;
        state.serialize_field("is_pinned", &self.is_pinned)?;
        state.serialize_field("parent_comment_id", &self.parent_comment_id)?;
        state.serialize_field("reactions", &self.reactions)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("edited_at", &self.edited_at)?;
        state.end()
    }
}

impl Threadable for Comment {
    fn id(&self) -> DbId {
        self.id
    }
    fn parent_id(&self) -> Option<DbId> {
        self.parent_comment_id
    }
    fn created_at(&self) -> Timestamp {
        self.created_at
    }
    fn is_pinned(&self) -> bool {
        self.is_pinned
    }
}

/// DTO for creating a comment.
#[derive(Debug, Deserialize)]
pub struct CreateComment {
    pub entity_type: String,
    pub entity_id: DbId,
    pub body: String,
    pub parent_comment_id: Option<DbId>,
}

/// DTO for editing a comment body.
#[derive(Debug, Deserialize)]
pub struct UpdateComment {
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(is_deleted: bool) -> Comment {
        Comment {
            id: 1,
            entity_type: "task".to_string(),
            entity_id: 7,
            author_id: 3,
            body: "original text".to_string(),
            is_deleted,
            is_pinned: false,
            parent_comment_id: None,
            reactions: serde_json::json!({}),
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    #[test]
    fn live_comment_renders_its_body() {
        assert_eq!(comment(false).display_body(), "original text");
    }

    #[test]
    fn deleted_comment_renders_placeholder() {
        assert_eq!(comment(true).display_body(), DELETED_PLACEHOLDER);
    }

    #[test]
    fn deleted_comment_never_serializes_original_text() {
        let json = serde_json::to_string(&comment(true)).unwrap();
        assert!(!json.contains("original text"));
        assert!(json.contains(DELETED_PLACEHOLDER));
    }
}
