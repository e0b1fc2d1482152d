//! Repository for `user_sessions`, the refresh-token store.
//!
//! Rotation is built from two pieces that share one transaction:
//! [`SessionRepo::consume_in_tx`] burns the presented token and
//! [`SessionRepo::open_in_tx`] stores its replacement. Two requests racing
//! with the same token cannot both consume it.

use modiste_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{NewRefreshSession, RefreshSession};
use crate::repositories::PgTx;

const COLUMNS: &str = "id, user_id, expires_at, user_agent, created_at";

pub struct SessionRepo;

impl SessionRepo {
    /// Open a session inside an existing transaction.
    pub async fn open_in_tx(
        tx: &mut PgTx<'_>,
        input: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .fetch_one(&mut **tx)
            .await
    }

    /// Open a session on login or registration.
    pub async fn open(
        pool: &PgPool,
        input: &NewRefreshSession,
    ) -> Result<RefreshSession, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let session = Self::open_in_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(session)
    }

    /// Revoke the live session holding this token hash and return it.
    ///
    /// `None` means the token is unknown, expired, or already used.
    pub async fn consume_in_tx(
        tx: &mut PgTx<'_>,
        refresh_token_hash: &str,
    ) -> Result<Option<RefreshSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET is_revoked = true
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RefreshSession>(&query)
            .bind(refresh_token_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Sign a user out everywhere. Returns how many sessions were live.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND is_revoked = false",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Purge sessions that can no longer be used. Returns the rows removed.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM user_sessions WHERE expires_at < NOW() OR is_revoked = true")
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
