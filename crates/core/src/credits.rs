//! Credit ledger rules.
//!
//! Balances are whole credits stored as `BIGINT`. A generation is charged
//! only after the provider succeeds, and the charge itself is a single
//! conditional update in the repository layer. This module decides *whether*
//! and *how much* to charge; it never mutates anything.

use crate::error::CoreError;
use crate::roles;

/// Balance reported for accounts that bypass billing. Admin accounts are also
/// provisioned with this many credits.
pub const ADMIN_CREDIT_BALANCE: i64 = 999_999;

/// Credits granted to a regular account at registration unless configured
/// otherwise.
pub const DEFAULT_SIGNUP_CREDITS: i64 = 10;

/// Cost of one generated image.
pub const CREDITS_PER_IMAGE: i64 = 1;

/// Cost of one virtual try-on composite.
pub const CREDITS_PER_TRY_ON: i64 = 2;

/// Largest single grant an admin may issue.
pub const MAX_GRANT: i64 = 100_000;

/// Ledger reasons recorded in `credit_transactions.reason`.
pub mod reasons {
    pub const SIGNUP: &str = "signup";
    pub const GENERATION: &str = "generation";
    pub const TRY_ON: &str = "try_on";
    pub const ADMIN_GRANT: &str = "admin_grant";
}

/// What the ledger should do for a billable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitPlan {
    /// Deduct this many credits once the provider call succeeds.
    Charge(i64),
    /// The account is exempt from billing; nothing is deducted.
    Bypass,
}

/// Total cost of generating `num_images` images.
pub fn generation_cost(num_images: i64) -> i64 {
    num_images.max(0) * CREDITS_PER_IMAGE
}

/// Decide how a request costing `cost` credits is billed for an account.
///
/// Admin accounts always get [`DebitPlan::Bypass`]. Everyone else must hold
/// at least `cost` credits, otherwise [`CoreError::InsufficientCredits`].
pub fn check_balance(role: &str, balance: i64, cost: i64) -> Result<DebitPlan, CoreError> {
    if roles::bypasses_billing(role) {
        return Ok(DebitPlan::Bypass);
    }
    if balance < cost {
        return Err(CoreError::InsufficientCredits {
            required: cost,
            available: balance,
        });
    }
    Ok(DebitPlan::Charge(cost))
}

/// Balance to report back to a client after a request has been billed.
pub fn reported_balance(plan: DebitPlan, remaining: i64) -> i64 {
    match plan {
        DebitPlan::Bypass => ADMIN_CREDIT_BALANCE,
        DebitPlan::Charge(_) => remaining,
    }
}

/// Validate an admin credit grant.
pub fn validate_grant(amount: i64) -> Result<(), CoreError> {
    if amount <= 0 {
        return Err(CoreError::Validation(
            "Credit amount must be a positive integer".into(),
        ));
    }
    if amount > MAX_GRANT {
        return Err(CoreError::Validation(format!(
            "Credit amount must not exceed {MAX_GRANT}"
        )));
    }
    Ok(())
}

/// Initial balance for a freshly provisioned account.
pub fn signup_balance(role: &str, default_credits: i64) -> i64 {
    if roles::bypasses_billing(role) {
        ADMIN_CREDIT_BALANCE
    } else {
        default_credits.max(0)
    }
}
