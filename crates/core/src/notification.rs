//! Notification kind constants.
//!
//! These must match the `notifications.kind` values consumed by the
//! inbox view. The in-app row is the guaranteed channel; email is
//! best-effort and gated by the recipient's preferences.

/// General informational notification (assignments, decisions).
pub const KIND_INFO: &str = "info";

/// Deadline warnings from the background check.
pub const KIND_WARNING: &str = "warning";

/// An @mention in a comment.
pub const KIND_MENTION: &str = "mention";

/// The set of all notification kinds.
pub const VALID_KINDS: &[&str] = &[KIND_INFO, KIND_WARNING, KIND_MENTION];

/// Returns `true` if the given kind is valid.
pub fn is_valid_kind(kind: &str) -> bool {
    VALID_KINDS.contains(&kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_kinds() {
        assert!(is_valid_kind("info"));
        assert!(is_valid_kind("warning"));
        assert!(is_valid_kind("mention"));
    }

    #[test]
    fn test_invalid_kinds() {
        assert!(!is_valid_kind(""));
        assert!(!is_valid_kind("Mention"));
        assert!(!is_valid_kind("alert"));
    }
}
