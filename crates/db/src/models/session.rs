//! Refresh-token sessions.
//!
//! Only the SHA-256 of a refresh token is stored. A session is consumed the
//! first time its token is exchanged, so each token works exactly once.

use modiste_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row of `user_sessions`.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshSession {
    pub id: DbId,
    pub user_id: DbId,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
    pub created_at: Timestamp,
}

/// A session to open for a freshly issued refresh token.
pub struct NewRefreshSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub user_agent: Option<String>,
}
