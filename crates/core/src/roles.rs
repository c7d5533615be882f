//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_VOLUNTEER: &str = "volunteer";
pub const ROLE_USER: &str = "user";

/// All assignable roles.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_VOLUNTEER, ROLE_USER];

/// Moderators (admins and volunteers) see every donation request and may
/// change user status.
pub fn is_moderator(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_VOLUNTEER
}

/// Validate that a role string is one of the assignable roles.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}
