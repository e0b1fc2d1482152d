//! HTTP-level tests for profile, password, preferences and credits.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, error_body, get_auth, post_auth, post_json, post_json_auth, put_json_auth,
    register, ADMIN_EMAIL, PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn profile_update_changes_name_and_email(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register(app.clone(), "before@example.com").await;

    let response = put_json_auth(
        app.clone(),
        "/api/users/profile",
        json!({ "name": "Coco", "email": "After@Example.com" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get_auth(app, "/api/users/profile", &token).await).await;
    assert_eq!(json["data"]["name"], "Coco");
    assert_eq!(json["data"]["email"], "after@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn profile_email_must_be_unique(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(app.clone(), "taken@example.com").await;
    let (token, _) = register(app.clone(), "mover@example.com").await;

    let response = put_json_auth(
        app,
        "/api/users/profile",
        json!({ "email": "taken@example.com" }),
        &token,
    )
    .await;

    let (code, message) = error_body(response, StatusCode::CONFLICT).await;
    assert_eq!(code, "CONFLICT");
    assert_eq!(message, "Email is already in use");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn password_change_requires_current_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register(app.clone(), "secure@example.com").await;

    let response = put_json_auth(
        app.clone(),
        "/api/users/password",
        json!({ "currentPassword": "wrong-password", "newPassword": "brand-new-pass" }),
        &token,
    )
    .await;
    let (_, message) = error_body(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Current password is incorrect");

    let response = put_json_auth(
        app.clone(),
        "/api/users/password",
        json!({ "currentPassword": PASSWORD, "newPassword": "brand-new-pass" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let old = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "email": "secure@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = post_json(
        app,
        "/api/auth/login",
        json!({ "email": "secure@example.com", "password": "brand-new-pass" }),
    )
    .await;
    assert_eq!(new.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn preferences_are_stored_verbatim(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (token, _) = register(app.clone(), "prefs@example.com").await;
    let prefs = json!({ "theme": "dark", "grid": { "snap": true, "size": 16 } });

    let response = put_json_auth(
        app.clone(),
        "/api/users/preferences",
        json!({ "preferences": prefs }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get_auth(app, "/api/users/profile", &token).await).await;
    assert_eq!(json["data"]["preferences"], prefs);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn credits_balance_reports_unlimited_for_admin(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (user, _) = register(app.clone(), "plain@example.com").await;
    let (admin, _) = register(app.clone(), ADMIN_EMAIL).await;

    let json = body_json(get_auth(app.clone(), "/api/users/credits", &user).await).await;
    assert_eq!(json["data"]["credits"], 10);
    assert_eq!(json["data"]["unlimited"], false);

    let json = body_json(get_auth(app, "/api/users/credits", &admin).await).await;
    assert_eq!(json["data"]["unlimited"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_grants_credits(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = register(app.clone(), ADMIN_EMAIL).await;
    let (token, user) = register(app.clone(), "topup@example.com").await;
    let uri = format!("/api/users/{}/credits", user["id"]);

    let response = post_json_auth(
        app.clone(),
        &uri,
        json!({ "amount": 25, "note": "launch promo" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["credits"], 35);

    let history = body_json(get_auth(app, "/api/users/credits/history", &token).await).await;
    assert_eq!(history["data"][0]["delta"], 25);
    assert_eq!(history["data"][0]["reason"], "admin_grant");
    assert!(history["data"][0]["reference"]
        .as_str()
        .unwrap()
        .ends_with("launch promo"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn grant_is_admin_only_and_validated(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = register(app.clone(), ADMIN_EMAIL).await;
    let (token, user) = register(app.clone(), "greedy@example.com").await;
    let uri = format!("/api/users/{}/credits", user["id"]);

    let response = post_json_auth(app.clone(), &uri, json!({ "amount": 100 }), &token).await;
    let (code, _) = error_body(response, StatusCode::FORBIDDEN).await;
    assert_eq!(code, "FORBIDDEN");

    let response = post_json_auth(app.clone(), &uri, json!({ "amount": 0 }), &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app,
        "/api/users/999999/credits",
        json!({ "amount": 5 }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_account_is_locked_out_immediately(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = register(app.clone(), ADMIN_EMAIL).await;
    let (token, user) = register(app.clone(), "leaving@example.com").await;

    let login = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "email": "leaving@example.com", "password": PASSWORD }),
    )
    .await;
    let refresh_token = body_json(login).await["data"]["refreshToken"]
        .as_str()
        .unwrap()
        .to_string();

    let uri = format!("/api/users/{}/deactivate", user["id"]);
    let response = post_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "User deactivated");

    // The access token is still within its lifetime but no longer works.
    let response = get_auth(app.clone(), "/api/users/credits", &token).await;
    let (code, message) = error_body(response, StatusCode::FORBIDDEN).await;
    assert_eq!(code, "FORBIDDEN");
    assert_eq!(message, "Account is deactivated");

    let response = post_json_auth(
        app.clone(),
        "/api/generation/generate",
        json!({ "prompt": "farewell gown", "numImages": 1 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(
        app.clone(),
        "/api/auth/refresh",
        json!({ "refreshToken": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "email": "leaving@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivation_is_admin_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, admin_user) = register(app.clone(), ADMIN_EMAIL).await;
    let (token, _) = register(app.clone(), "meddler@example.com").await;
    let (_, target) = register(app.clone(), "target@example.com").await;

    let uri = format!("/api/users/{}/deactivate", target["id"]);
    let response = post_auth(app.clone(), &uri, &token).await;
    let (code, _) = error_body(response, StatusCode::FORBIDDEN).await;
    assert_eq!(code, "FORBIDDEN");

    let own = format!("/api/users/{}/deactivate", admin_user["id"]);
    let response = post_auth(app.clone(), &own, &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_auth(app, "/api/users/999999/deactivate", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
