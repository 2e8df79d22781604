//! Well-known role name constants.
//!
//! These must match the `chk_users_role` constraint in the users migration.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CUSTOMER: &str = "customer";

/// Every role a user row may carry.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CUSTOMER];

/// Reject role names outside [`VALID_ROLES`].
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {VALID_ROLES:?}"
        )))
    }
}

/// Returns `true` if `role` is one of `required`.
pub fn has_any_role(role: &str, required: &[&str]) -> bool {
    required.iter().any(|r| *r == role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_validate() {
        assert!(validate_role("admin").is_ok());
        assert!(validate_role("customer").is_ok());
        assert!(validate_role("root").is_err());
    }

    #[test]
    fn has_any_role_matches_exactly() {
        assert!(has_any_role("admin", &[ROLE_ADMIN]));
        assert!(!has_any_role("Admin", &[ROLE_ADMIN]));
        assert!(has_any_role("customer", &[ROLE_ADMIN, ROLE_CUSTOMER]));
    }
}
