//! Credit ledger history rows.

use modiste_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One balance change from the `credit_transactions` table.
///
/// `delta` is negative for debits and positive for grants.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub id: DbId,
    pub user_id: DbId,
    pub delta: i64,
    pub balance_after: i64,
    pub reason: String,
    pub reference: Option<String>,
    pub created_at: Timestamp,
}

/// Result of a conditional debit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    /// Credits were deducted; `remaining` is the new balance.
    Debited { remaining: i64 },
    /// The account bypasses billing; nothing was deducted.
    Bypassed,
    /// The balance was too low; nothing was deducted.
    Insufficient { available: i64 },
    /// No such user.
    UserNotFound,
}
