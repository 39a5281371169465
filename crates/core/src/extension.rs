//! Deadline-extension request state machine.
//!
//! A requester asks a workspace admin to move a task's due date. The
//! request starts `Pending` and ends `Approved` or `Rejected`; both are
//! terminal. Approval does not move the task's due date itself -- the
//! deciding admin updates the task separately.

/// Request is waiting for an admin decision.
pub const STATUS_PENDING: &str = "Pending";
/// Request was granted. Terminal.
pub const STATUS_APPROVED: &str = "Approved";
/// Request was declined. Terminal.
pub const STATUS_REJECTED: &str = "Rejected";

/// The set of all extension-request statuses.
pub const VALID_STATUSES: &[&str] = &[STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED];

/// Returns the set of valid target statuses reachable from `from`.
///
/// Terminal states return an empty slice because no further transitions
/// are allowed.
pub fn valid_transitions(from: &str) -> &'static [&'static str] {
    match from {
        STATUS_PENDING => &[STATUS_APPROVED, STATUS_REJECTED],
        _ => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: &str, to: &str) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a state transition, returning an error message for invalid ones.
pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(format!("Invalid extension transition: {from} -> {to}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Valid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn pending_to_approved() {
        assert!(can_transition(STATUS_PENDING, STATUS_APPROVED));
    }

    #[test]
    fn pending_to_rejected() {
        assert!(can_transition(STATUS_PENDING, STATUS_REJECTED));
    }

    // -----------------------------------------------------------------------
    // Terminal states have no outgoing transitions
    // -----------------------------------------------------------------------

    #[test]
    fn approved_has_no_transitions() {
        assert!(valid_transitions(STATUS_APPROVED).is_empty());
    }

    #[test]
    fn rejected_has_no_transitions() {
        assert!(valid_transitions(STATUS_REJECTED).is_empty());
    }

    // -----------------------------------------------------------------------
    // Invalid transitions
    // -----------------------------------------------------------------------

    #[test]
    fn approved_to_rejected_invalid() {
        assert!(!can_transition(STATUS_APPROVED, STATUS_REJECTED));
    }

    #[test]
    fn rejected_to_pending_invalid() {
        assert!(!can_transition(STATUS_REJECTED, STATUS_PENDING));
    }

    #[test]
    fn pending_to_pending_invalid() {
        assert!(!can_transition(STATUS_PENDING, STATUS_PENDING));
    }

    #[test]
    fn unknown_status_has_no_transitions() {
        assert!(valid_transitions("Escalated").is_empty());
    }

    // -----------------------------------------------------------------------
    // validate_transition returns descriptive error
    // -----------------------------------------------------------------------

    #[test]
    fn validate_transition_ok() {
        assert!(validate_transition(STATUS_PENDING, STATUS_APPROVED).is_ok());
    }

    #[test]
    fn validate_transition_err() {
        let err = validate_transition(STATUS_APPROVED, STATUS_PENDING).unwrap_err();
        assert!(err.contains("Approved"));
        assert!(err.contains("Pending"));
    }
}
