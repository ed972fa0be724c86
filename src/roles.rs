//! Role names issued by the API.

pub const SUPER_ADMIN: &str = "SuperAdmin";
pub const ADMIN: &str = "Admin";

/// Roles that may edit products and create users.
pub const ADMIN_ROLES: &[&str] = &[SUPER_ADMIN, ADMIN];

#[must_use]
pub fn is_admin(role: Option<&str>) -> bool {
    role.is_some_and(|role| ADMIN_ROLES.contains(&role))
}
