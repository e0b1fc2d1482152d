//! Route definitions for the `/products` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::products;
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /            -> list_products
/// POST   /            -> create_product (multipart)
/// GET    /{id}        -> get_product (includes inactive)
/// PUT    /{id}        -> update_product
/// DELETE /{id}        -> delete_product (deactivates)
/// POST   /{id}/use    -> use_product
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/{id}/use", post(products::use_product))
}
