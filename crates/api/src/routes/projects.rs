//! Route definitions for the `/projects` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                 -> list_projects
/// POST   /                 -> create_project
/// GET    /{id}             -> get_project
/// PUT    /{id}             -> update_project
/// DELETE /{id}             -> delete_project
/// PATCH  /{id}/autosave    -> auto_save_project
/// POST   /{id}/duplicate   -> duplicate_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/{id}/autosave", patch(projects::auto_save_project))
        .route("/{id}/duplicate", post(projects::duplicate_project))
}
