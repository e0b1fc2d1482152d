//! Route definitions for the `/generation` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/generation`.
///
/// ```text
/// POST /generate -> generate (credit-checked)
/// POST /try-on   -> try_on (credit-checked)
/// GET  /cost     -> get_cost
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generation::generate))
        .route("/try-on", post(generation::try_on))
        .route("/cost", get(generation::get_cost))
}
