//! Route definitions for the `/images` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::images;
use crate::state::AppState;

/// Routes mounted at `/images`.
///
/// ```text
/// GET    /                -> list_images
/// GET    /{id}            -> get_image
/// DELETE /{id}            -> delete_image
/// PATCH  /{id}/favorite   -> set_favorite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(images::list_images))
        .route(
            "/{id}",
            get(images::get_image).delete(images::delete_image),
        )
        .route("/{id}/favorite", patch(images::set_favorite))
}
