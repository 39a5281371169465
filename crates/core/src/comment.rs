//! Comment validation, entity scoping, and tombstone rendering.

use crate::error::CoreError;

/// Maximum length for a comment body in characters.
pub const MAX_COMMENT_LENGTH: usize = 10_000;

/// Placeholder body shown in place of a soft-deleted comment.
///
/// The stored text is retained but never rendered again, to anyone,
/// including the original author.
pub const DELETED_PLACEHOLDER: &str = "[comment deleted]";

/// Entity kinds a comment can attach to.
pub mod entity_types {
    pub const TASK: &str = "task";
    pub const PROJECT: &str = "project";
}

/// The set of all valid comment entity types.
pub const VALID_ENTITY_TYPES: &[&str] = &[entity_types::TASK, entity_types::PROJECT];

/// Returns `true` if the given entity type can carry comments.
pub fn is_valid_entity_type(entity_type: &str) -> bool {
    VALID_ENTITY_TYPES.contains(&entity_type)
}

/// Validate a comment body: must be non-blank and within the length limit.
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment must not be empty".to_string(),
        ));
    }
    if body.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters (got {})",
            body.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_entity_types() {
        assert!(is_valid_entity_type("task"));
        assert!(is_valid_entity_type("project"));
    }

    #[test]
    fn invalid_entity_types() {
        assert!(!is_valid_entity_type(""));
        assert!(!is_valid_entity_type("Task"));
        assert!(!is_valid_entity_type("workspace"));
    }

    #[test]
    fn valid_body_accepted() {
        assert!(validate_body("Looks good to me").is_ok());
    }

    #[test]
    fn blank_body_rejected() {
        assert!(validate_body("").is_err());
        assert!(validate_body(" \n\t ").is_err());
    }

    #[test]
    fn over_long_body_rejected() {
        let body = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(validate_body(&body).is_err());
    }
}
