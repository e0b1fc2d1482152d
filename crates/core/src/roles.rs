//! Well-known role name constants and signup-time role resolution.
//!
//! These must match the `chk_users_role` constraint in the `users` migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Whether the role bypasses credit billing.
pub fn bypasses_billing(role: &str) -> bool {
    role == ROLE_ADMIN
}

/// Decide the role a new account is provisioned with.
///
/// Accounts whose email appears in the configured admin list become admins;
/// everyone else is a regular user. Matching ignores case and surrounding
/// whitespace. The role is stored once at registration and never recomputed
/// from the email afterwards.
pub fn resolve_signup_role(email: &str, admin_emails: &[String]) -> &'static str {
    let email = email.trim();
    if admin_emails
        .iter()
        .any(|admin| admin.trim().eq_ignore_ascii_case(email))
    {
        ROLE_ADMIN
    } else {
        ROLE_USER
    }
}
