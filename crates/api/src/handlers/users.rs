//! Handlers for the `/users` resource: profile, password, preferences and
//! the credit balance.

use axum::extract::{Path, Query, State};
use axum::Json;
use modiste_core::account::{normalize_email, validate_display_name, validate_preferences};
use modiste_core::credits::{reasons, validate_grant, ADMIN_CREDIT_BALANCE};
use modiste_core::error::CoreError;
use modiste_core::types::DbId;
use modiste_db::models::credit_transaction::CreditTransaction;
use modiste_db::models::user::{UpdateProfile, UserResponse};
use modiste_db::repositories::{CreditRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::auth::load_user;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::{DataResponse, MessageResponse, PagedResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub preferences: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GrantCreditsRequest {
    pub amount: i64,
    pub note: Option<String>,
}

/// Current balance as shown to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditBalance {
    pub credits: i64,
    /// `true` for accounts that are never billed.
    pub unlimited: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResult {
    pub user_id: DbId,
    pub credits: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/users/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, auth.user_id).await?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// PUT /api/users/profile
///
/// Change display name and/or email. A taken email is a 409.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let name = input.name.as_deref().map(validate_display_name).transpose()?;
    let email = input.email.as_deref().map(normalize_email).transpose()?;

    if let Some(email) = &email {
        if let Some(existing) = UserRepo::find_by_email(&state.pool, email).await? {
            if existing.id != auth.user_id {
                return Err(AppError::Core(CoreError::Conflict(
                    "Email is already in use".into(),
                )));
            }
        }
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &UpdateProfile { name, email })
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// PUT /api/users/password
///
/// Requires the current password. All sessions are revoked afterwards, so
/// other devices must sign in again.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user = load_user(&state, auth.user_id).await?;

    let current_ok = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_ok {
        return Err(AppError::BadRequest("Current password is incorrect".into()));
    }
    validate_password_strength(&input.new_password)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// PUT /api/users/preferences
///
/// Replace the opaque preferences object.
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<PreferencesRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_preferences(&input.preferences)?;
    let user = UserRepo::update_preferences(&state.pool, auth.user_id, &input.preferences)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

/// GET /api/users/credits
pub async fn get_credits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<CreditBalance>>> {
    let user = load_user(&state, auth.user_id).await?;
    Ok(Json(DataResponse::new(CreditBalance {
        credits: user.display_credits(),
        unlimited: user.is_admin(),
    })))
}

/// GET /api/users/credits/history
///
/// The caller's ledger, newest first.
pub async fn credit_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PagedResponse<CreditTransaction>>> {
    let (limit, offset) = params.window();
    let entries = CreditRepo::history(&state.pool, auth.user_id, limit, offset).await?;
    let total = CreditRepo::count_history(&state.pool, auth.user_id).await?;
    Ok(Json(PagedResponse::new(entries, total, limit, offset)))
}

/// POST /api/users/{id}/credits
///
/// Admin-only unconditional grant.
pub async fn grant_credits(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
    AppJson(input): AppJson<GrantCreditsRequest>,
) -> AppResult<Json<DataResponse<GrantResult>>> {
    validate_grant(input.amount)?;

    let target = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    if target.is_admin() {
        // Admin balances are not tracked.
        return Ok(Json(DataResponse::new(GrantResult {
            user_id,
            credits: ADMIN_CREDIT_BALANCE,
        })));
    }

    let reference = match input.note.as_deref().map(str::trim) {
        Some(note) if !note.is_empty() => format!("admin:{} {note}", admin.user_id),
        _ => format!("admin:{}", admin.user_id),
    };
    let credits = CreditRepo::grant(
        &state.pool,
        user_id,
        input.amount,
        reasons::ADMIN_GRANT,
        Some(&reference),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: user_id,
    }))?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id,
        amount = input.amount,
        credits,
        "Credits granted"
    );
    Ok(Json(DataResponse::new(GrantResult { user_id, credits })))
}

/// POST /api/users/{id}/deactivate
///
/// Admin-only. The account can no longer sign in, refresh, or spend credits,
/// and every session it holds is revoked.
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if user_id == admin.user_id {
        return Err(AppError::BadRequest("Admins cannot deactivate their own account".into()));
    }
    if UserRepo::find_by_id(&state.pool, user_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }

    let changed = UserRepo::deactivate(&state.pool, user_id).await?;
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, user_id).await?;

    tracing::info!(admin_id = admin.user_id, user_id, changed, revoked, "User deactivated");
    Ok(Json(MessageResponse::new("User deactivated")))
}
