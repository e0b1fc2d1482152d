//! Route definitions for the `/users` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET  /profile          -> get_profile
/// PUT  /profile          -> update_profile
/// PUT  /password         -> change_password
/// PUT  /preferences      -> update_preferences
/// GET  /credits          -> get_credits
/// GET  /credits/history  -> credit_history
/// POST /{id}/credits     -> grant_credits (admin only)
/// POST /{id}/deactivate  -> deactivate_user (admin only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/password", put(users::change_password))
        .route("/preferences", put(users::update_preferences))
        .route("/credits", get(users::get_credits))
        .route("/credits/history", get(users::credit_history))
        .route("/{id}/credits", post(users::grant_credits))
        .route("/{id}/deactivate", post(users::deactivate_user))
}
