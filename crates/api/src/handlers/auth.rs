//! Handlers for the `/auth` resource (register, login, refresh, logout, me).

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use modiste_core::account::{normalize_email, validate_display_name};
use modiste_core::credits::{reasons, signup_balance};
use modiste_core::error::CoreError;
use modiste_core::roles::resolve_signup_role;
use modiste_core::types::DbId;
use modiste_db::models::session::NewRefreshSession;
use modiste_db::models::user::{CreateUser, User, UserResponse};
use modiste_db::repositories::{CreditRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Tokens plus the account they belong to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create an account and sign it in. The role is decided here, once: emails
/// listed in `ADMIN_EMAILS` become admins with the sentinel balance, everyone
/// else starts with `SIGNUP_CREDITS`.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    let email = normalize_email(&input.email)?;
    validate_password_strength(&input.password)?;
    let name = match input.name.as_deref() {
        Some(name) => validate_display_name(name)?,
        None => email.split('@').next().unwrap_or_default().to_string(),
    };

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let role = resolve_signup_role(&email, &state.config.admin_emails);
    let credits = signup_balance(role, state.config.signup_credits);
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let mut tx = state.pool.begin().await?;
    let user = UserRepo::create_in_tx(
        &mut tx,
        &CreateUser {
            email,
            password_hash,
            name,
            role: role.to_string(),
            credits,
        },
    )
    .await?;
    if credits > 0 {
        CreditRepo::record_opening_balance(&mut tx, user.id, credits, reasons::SIGNUP).await?;
    }
    tx.commit().await?;

    tracing::info!(user_id = user.id, role = %user.role, credits, "User registered");

    let response = create_auth_response(&state, &user, user_agent(&headers)).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(response))))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let email = normalize_email(&input.email).map_err(|_| invalid())?;
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    ensure_active(&user)?;

    UserRepo::record_login(&state.pool, user.id).await?;

    let response = create_auth_response(&state, &user, user_agent(&headers)).await?;
    Ok(Json(DataResponse::new(response)))
}

/// POST /api/auth/refresh
///
/// Exchange a refresh token for a new token pair. Consuming the old session
/// and opening the new one commit together, so each refresh token works
/// exactly once even under concurrent requests.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let mut tx = state.pool.begin().await?;
    let session = SessionRepo::consume_in_tx(&mut tx, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    ensure_active(&user)?;

    let (response, next) = issue_tokens(&state, &user, user_agent(&headers))?;
    SessionRepo::open_in_tx(&mut tx, &next).await?;
    tx.commit().await?;

    tracing::debug!(user_id = user.id, rotated = session.id, "Refresh token rotated");
    Ok(Json(DataResponse::new(response)))
}

/// POST /api/auth/logout
///
/// Revoke every session of the authenticated user.
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<MessageResponse>> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state, auth_user.user_id).await?;
    Ok(Json(DataResponse::new(UserResponse::from(&user))))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the authenticated account.
///
/// Tokens outlive account changes, so a deleted account is a 401 and a
/// deactivated one a 403 even while its access token is still valid.
pub(crate) async fn load_user(state: &AppState, user_id: DbId) -> AppResult<User> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;
    ensure_active(&user)?;
    Ok(user)
}

fn ensure_active(user: &User) -> AppResult<()> {
    if user.is_active {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden("Account is deactivated".into())))
    }
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Mint an access token and a refresh token, returning the response body and
/// the session row that must be stored for the refresh token.
fn issue_tokens(
    state: &AppState,
    user: &User,
    user_agent: Option<String>,
) -> AppResult<(AuthResponse, NewRefreshSession)> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh = generate_refresh_token(&state.config.jwt);

    let session = NewRefreshSession {
        user_id: user.id,
        refresh_token_hash: refresh.hash,
        expires_at: refresh.expires_at,
        user_agent,
    };
    let response = AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: state.config.jwt.access_expires_in(),
        user: UserResponse::from(user),
    };
    Ok((response, session))
}

/// Issue tokens for a fresh sign-in and persist the session.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    user_agent: Option<String>,
) -> AppResult<AuthResponse> {
    let (response, session) = issue_tokens(state, user, user_agent)?;
    SessionRepo::open(&state.pool, &session).await?;
    Ok(response)
}
