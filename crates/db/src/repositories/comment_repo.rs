//! Repository for the `comments` table.

use ems_core::types::DbId;
use sqlx::PgPool;

use crate::models::comment::{Comment, CreateComment};

/// Column list for `comments` queries.
const COLUMNS: &str = "id, entity_type, entity_id, author_id, body, is_deleted, is_pinned, \
                       parent_comment_id, reactions, created_at, edited_at";

/// Provides CRUD operations for comments.
///
/// Comments are never physically removed: deletion flips the tombstone
/// flag and the row keeps its thread position.
pub struct CommentRepo;

impl CommentRepo {
    /// Insert a new comment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateComment,
        author_id: DbId,
    ) -> Result<Comment, sqlx::Error> {
        let query = format!(
            "INSERT INTO comments (entity_type, entity_id, author_id, body, parent_comment_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(author_id)
            .bind(&input.body)
            .bind(input.parent_comment_id)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by its internal ID. Tombstoned rows are returned
    /// too -- rendering decides what to show.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comments WHERE id = $1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all comments on an entity, oldest first. Includes tombstoned
    /// rows so threads keep their shape.
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: DbId,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comments
             WHERE entity_type = $1 AND entity_id = $2
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(entity_type)
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    /// Edit a comment's body, stamping `edited_at`. Only the author can
    /// edit, and never a tombstoned comment.
    ///
    /// Returns the updated row, or `None` when no matching live comment
    /// by this author exists.
    pub async fn update_body(
        pool: &PgPool,
        id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET body = $3, edited_at = NOW()
             WHERE id = $1 AND author_id = $2 AND is_deleted = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(author_id)
            .bind(body)
            .fetch_optional(pool)
            .await
    }

    /// Tombstone a comment. The body column is retained but will render
    /// as a placeholder. Returns `true` if a live row was tombstoned.
    pub async fn soft_delete(pool: &PgPool, id: DbId, author_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE comments SET is_deleted = TRUE
             WHERE id = $1 AND author_id = $2 AND is_deleted = FALSE",
        )
        .bind(id)
        .bind(author_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pin or unpin a top-level comment. Returns the updated row, or
    /// `None` if the comment does not exist.
    pub async fn set_pinned(
        pool: &PgPool,
        id: DbId,
        pinned: bool,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!(
            "UPDATE comments SET is_pinned = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .bind(pinned)
            .fetch_optional(pool)
            .await
    }

    /// Toggle a user's reaction to a comment: adds the user under the
    /// emoji key, or removes them when already present.
    ///
    /// Returns the updated row, or `None` if the comment does not exist.
    pub async fn toggle_reaction(
        pool: &PgPool,
        id: DbId,
        emoji: &str,
        user_id: DbId,
    ) -> Result<Option<Comment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM comments WHERE id = $1 FOR UPDATE");
        let Some(comment) = sqlx::query_as::<_, Comment>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut reactions = comment.reactions.clone();
        let map = reactions
            .as_object_mut()
            .ok_or_else(|| sqlx::Error::Decode("reactions column is not a JSON object".into()))?;

        let users = map
            .entry(emoji.to_string())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        let list = users
            .as_array_mut()
            .ok_or_else(|| sqlx::Error::Decode("reaction entry is not a JSON array".into()))?;

        let user_value = serde_json::Value::from(user_id);
        if let Some(pos) = list.iter().position(|v| *v == user_value) {
            list.remove(pos);
        } else {
            list.push(user_value);
        }
        if list.is_empty() {
            map.remove(emoji);
        }

        let update = format!(
            "UPDATE comments SET reactions = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Comment>(&update)
            .bind(id)
            .bind(&reactions)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }
}
