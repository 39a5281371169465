//! Workspace role name constants and helpers.
//!
//! These must match the `workspace_members.role` values seeded and
//! validated by the membership endpoints.

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_WORKSPACE_ADMIN: &str = "workspace_admin";
pub const ROLE_EMPLOYEE: &str = "employee";

/// The set of all valid workspace roles.
pub const VALID_ROLES: &[&str] = &[ROLE_OWNER, ROLE_WORKSPACE_ADMIN, ROLE_EMPLOYEE];

/// Returns `true` if the given role name is valid.
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

/// Returns `true` for roles that can manage members, decide extension
/// requests, and receive admin notifications.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_OWNER || role == ROLE_WORKSPACE_ADMIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_roles() {
        assert!(is_valid_role("owner"));
        assert!(is_valid_role("workspace_admin"));
        assert!(is_valid_role("employee"));
    }

    #[test]
    fn test_invalid_roles() {
        assert!(!is_valid_role(""));
        assert!(!is_valid_role("Owner"));
        assert!(!is_valid_role("admin"));
    }

    #[test]
    fn test_admin_roles() {
        assert!(is_admin(ROLE_OWNER));
        assert!(is_admin(ROLE_WORKSPACE_ADMIN));
        assert!(!is_admin(ROLE_EMPLOYEE));
    }
}
