//! Credit ledger: conditional debits, grants and balance history.
//!
//! A debit is a single `UPDATE ... WHERE credits >= $amount` so two concurrent
//! requests can never take a balance below zero. Every applied change appends
//! a row to `credit_transactions` in the same transaction.

use modiste_core::roles::ROLE_ADMIN;
use modiste_core::types::DbId;
use sqlx::PgPool;

use crate::models::credit_transaction::{CreditTransaction, DebitOutcome};
use crate::repositories::PgTx;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, delta, balance_after, reason, reference, created_at";

/// Provides ledger operations on `users.credits`.
pub struct CreditRepo;

impl CreditRepo {
    /// Deduct `amount` credits from a user inside an open transaction.
    ///
    /// Admin accounts are never debited and report [`DebitOutcome::Bypassed`].
    /// If the balance is too low nothing changes and
    /// [`DebitOutcome::Insufficient`] carries the current balance.
    pub async fn debit_in_tx(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        amount: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<DebitOutcome, sqlx::Error> {
        let remaining: Option<(i64,)> = sqlx::query_as(
            "UPDATE users SET credits = credits - $2
             WHERE id = $1 AND role <> $3 AND credits >= $2
             RETURNING credits",
        )
        .bind(user_id)
        .bind(amount)
        .bind(ROLE_ADMIN)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some((remaining,)) = remaining {
            Self::append_in_tx(tx, user_id, -amount, remaining, reason, reference).await?;
            return Ok(DebitOutcome::Debited { remaining });
        }

        // Nothing was updated: work out why without writing anything.
        let current: Option<(String, i64)> =
            sqlx::query_as("SELECT role, credits FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(match current {
            None => DebitOutcome::UserNotFound,
            Some((role, _)) if role == ROLE_ADMIN => DebitOutcome::Bypassed,
            Some((_, available)) => DebitOutcome::Insufficient { available },
        })
    }

    /// Deduct credits in a transaction of its own.
    ///
    /// The transaction is committed only when credits were actually deducted.
    pub async fn debit(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<DebitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let outcome = Self::debit_in_tx(&mut tx, user_id, amount, reason, reference).await?;
        if matches!(outcome, DebitOutcome::Debited { .. }) {
            tx.commit().await?;
        }
        Ok(outcome)
    }

    /// Unconditionally add `amount` credits to a user.
    ///
    /// Returns the new balance, or `None` if the user does not exist.
    pub async fn grant(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<Option<i64>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let balance = Self::grant_in_tx(&mut tx, user_id, amount, reason, reference).await?;
        tx.commit().await?;
        Ok(balance)
    }

    /// Add credits inside an open transaction.
    pub async fn grant_in_tx(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        amount: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<Option<i64>, sqlx::Error> {
        let balance: Option<(i64,)> = sqlx::query_as(
            "UPDATE users SET credits = credits + $2 WHERE id = $1 RETURNING credits",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_optional(&mut **tx)
        .await?;

        match balance {
            Some((balance,)) => {
                Self::append_in_tx(tx, user_id, amount, balance, reason, reference).await?;
                Ok(Some(balance))
            }
            None => Ok(None),
        }
    }

    /// Record an opening balance for a freshly created account.
    pub async fn record_opening_balance(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        balance: i64,
        reason: &str,
    ) -> Result<(), sqlx::Error> {
        Self::append_in_tx(tx, user_id, balance, balance, reason, None).await
    }

    /// List a user's ledger history, newest first.
    pub async fn history(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CreditTransaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM credit_transactions
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CreditTransaction>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a user's ledger entries.
    pub async fn count_history(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM credit_transactions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    async fn append_in_tx(
        tx: &mut PgTx<'_>,
        user_id: DbId,
        delta: i64,
        balance_after: i64,
        reason: &str,
        reference: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO credit_transactions (user_id, delta, balance_after, reason, reference)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(delta)
        .bind(balance_after)
        .bind(reason)
        .bind(reference)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
