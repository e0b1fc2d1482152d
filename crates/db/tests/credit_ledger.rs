//! Integration tests for the credit ledger.
//!
//! Verifies that:
//! - A debit never takes a balance below zero
//! - Admin accounts are never debited
//! - Concurrent debits cannot overspend
//! - Grants and debits are recorded in the history, newest first

use modiste_core::credits::reasons;
use modiste_core::roles::{ROLE_ADMIN, ROLE_USER};
use modiste_db::models::credit_transaction::DebitOutcome;
use modiste_db::models::user::{CreateUser, User};
use modiste_db::repositories::{CreditRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str, role: &str, credits: i64) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            name: "Ledger Test".to_string(),
            role: role.to_string(),
            credits,
        },
    )
    .await
    .unwrap()
}

async fn balance(pool: &PgPool, user_id: i64) -> i64 {
    UserRepo::find_by_id(pool, user_id)
        .await
        .unwrap()
        .unwrap()
        .credits
}

// ---------------------------------------------------------------------------
// Debits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_debit_deducts_and_records(pool: PgPool) {
    let user = seed_user(&pool, "debit@test.com", ROLE_USER, 5).await;

    let outcome = CreditRepo::debit(&pool, user.id, 2, reasons::GENERATION, Some("req-1"))
        .await
        .unwrap();

    assert_eq!(outcome, DebitOutcome::Debited { remaining: 3 });
    assert_eq!(balance(&pool, user.id).await, 3);

    let history = CreditRepo::history(&pool, user.id, 10, 0).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].delta, -2);
    assert_eq!(history[0].balance_after, 3);
    assert_eq!(history[0].reason, reasons::GENERATION);
    assert_eq!(history[0].reference.as_deref(), Some("req-1"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_debit_insufficient_changes_nothing(pool: PgPool) {
    let user = seed_user(&pool, "poor@test.com", ROLE_USER, 1).await;

    let outcome = CreditRepo::debit(&pool, user.id, 4, reasons::GENERATION, None)
        .await
        .unwrap();

    assert_eq!(outcome, DebitOutcome::Insufficient { available: 1 });
    assert_eq!(balance(&pool, user.id).await, 1);
    assert_eq!(CreditRepo::count_history(&pool, user.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_debit_exact_balance_reaches_zero(pool: PgPool) {
    let user = seed_user(&pool, "exact@test.com", ROLE_USER, 3).await;

    let outcome = CreditRepo::debit(&pool, user.id, 3, reasons::GENERATION, None)
        .await
        .unwrap();
    assert_eq!(outcome, DebitOutcome::Debited { remaining: 0 });

    let outcome = CreditRepo::debit(&pool, user.id, 1, reasons::GENERATION, None)
        .await
        .unwrap();
    assert_eq!(outcome, DebitOutcome::Insufficient { available: 0 });
    assert_eq!(balance(&pool, user.id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_is_never_debited(pool: PgPool) {
    let admin = seed_user(&pool, "admin@test.com", ROLE_ADMIN, 999_999).await;

    for _ in 0..3 {
        let outcome = CreditRepo::debit(&pool, admin.id, 4, reasons::GENERATION, None)
            .await
            .unwrap();
        assert_eq!(outcome, DebitOutcome::Bypassed);
    }

    assert_eq!(balance(&pool, admin.id).await, 999_999);
    assert_eq!(CreditRepo::count_history(&pool, admin.id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_debit_unknown_user(pool: PgPool) {
    let outcome = CreditRepo::debit(&pool, 987_654, 1, reasons::GENERATION, None)
        .await
        .unwrap();
    assert_eq!(outcome, DebitOutcome::UserNotFound);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_debits_never_overspend(pool: PgPool) {
    let user = seed_user(&pool, "race@test.com", ROLE_USER, 5).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let pool = pool.clone();
        let user_id = user.id;
        handles.push(tokio::spawn(async move {
            let reference = format!("race-{i}");
            CreditRepo::debit(&pool, user_id, 1, reasons::GENERATION, Some(&reference))
                .await
                .unwrap()
        }));
    }

    let mut debited = 0;
    for handle in handles {
        if let DebitOutcome::Debited { .. } = handle.await.unwrap() {
            debited += 1;
        }
    }

    assert_eq!(debited, 5);
    assert_eq!(balance(&pool, user.id).await, 0);
    assert_eq!(CreditRepo::count_history(&pool, user.id).await.unwrap(), 5);
}

// ---------------------------------------------------------------------------
// Grants and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_grant_then_history_is_newest_first(pool: PgPool) {
    let user = seed_user(&pool, "grant@test.com", ROLE_USER, 0).await;

    let new_balance = CreditRepo::grant(&pool, user.id, 10, reasons::ADMIN_GRANT, Some("admin:1"))
        .await
        .unwrap();
    assert_eq!(new_balance, Some(10));

    CreditRepo::debit(&pool, user.id, 2, reasons::TRY_ON, None)
        .await
        .unwrap();

    let history = CreditRepo::history(&pool, user.id, 10, 0).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].reason, reasons::TRY_ON);
    assert_eq!(history[0].balance_after, 8);
    assert_eq!(history[1].reason, reasons::ADMIN_GRANT);
    assert_eq!(history[1].delta, 10);

    let page = CreditRepo::history(&pool, user.id, 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].reason, reasons::ADMIN_GRANT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grant_unknown_user(pool: PgPool) {
    let result = CreditRepo::grant(&pool, 987_654, 5, reasons::ADMIN_GRANT, None)
        .await
        .unwrap();
    assert_eq!(result, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_opening_balance_is_recorded(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let user = UserRepo::create_in_tx(
        &mut tx,
        &CreateUser {
            email: "opening@test.com".into(),
            password_hash: "x".into(),
            name: "Opening".into(),
            role: ROLE_USER.into(),
            credits: 10,
        },
    )
    .await
    .unwrap();
    CreditRepo::record_opening_balance(&mut tx, user.id, 10, reasons::SIGNUP)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let history = CreditRepo::history(&pool, user.id, 10, 0).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].delta, 10);
    assert_eq!(history[0].balance_after, 10);
    assert_eq!(history[0].reason, reasons::SIGNUP);
}
