//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// All assignable roles.
pub const ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER];

/// Returns `true` if `role` is one of [`ROLES`].
pub fn is_valid_role(role: &str) -> bool {
    ROLES.contains(&role)
}
