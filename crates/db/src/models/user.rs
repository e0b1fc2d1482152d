//! User entity model and DTOs.

use modiste_core::credits::ADMIN_CREDIT_BALANCE;
use modiste_core::roles;
use modiste_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub credits: i64,
    pub preferences: serde_json::Value,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_admin(&self) -> bool {
        roles::bypasses_billing(&self.role)
    }

    /// Balance shown to the client; admins always see the sentinel.
    pub fn display_credits(&self) -> i64 {
        if self.is_admin() {
            ADMIN_CREDIT_BALANCE
        } else {
            self.credits
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub credits: i64,
    pub preferences: serde_json::Value,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            credits: user.display_credits(),
            preferences: user.preferences.clone(),
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. Role and starting balance are decided by the
/// caller at provisioning time.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub credits: i64,
}

/// DTO for a profile update. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}
