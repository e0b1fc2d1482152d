pub mod auth;
pub mod generation;
pub mod health;
pub mod images;
pub mod products;
pub mod projects;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
/// /auth/me                             current user
///
/// /users/profile                       get, update
/// /users/password                      change password
/// /users/preferences                   replace preferences
/// /users/credits                       balance
/// /users/credits/history               paged ledger
/// /users/{id}/credits                  grant credits (admin only)
/// /users/{id}/deactivate               deactivate account (admin only)
///
/// /projects                            list, create
/// /projects/{id}                       get, update, soft delete
/// /projects/{id}/autosave              overwrite graph (PATCH)
/// /projects/{id}/duplicate             copy as draft (POST)
///
/// /generation/generate                 text-to-image (credit-checked)
/// /generation/try-on                   virtual try-on (credit-checked)
/// /generation/cost                     price quote
///
/// /images                              list
/// /images/{id}                         get, soft delete
/// /images/{id}/favorite                set or toggle favorite (PATCH)
///
/// /products                            list, create (multipart)
/// /products/{id}                       get, update, deactivate
/// /products/{id}/use                   bump usage counter (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication and session management.
        .nest("/auth", auth::router())
        // Profile, preferences and credits.
        .nest("/users", users::router())
        // Canvas projects.
        .nest("/projects", projects::router())
        // Billed image generation.
        .nest("/generation", generation::router())
        // Generation history.
        .nest("/images", images::router())
        // Garment catalog.
        .nest("/products", products::router())
}
