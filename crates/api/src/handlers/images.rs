//! Handlers for the `/images` resource (the caller's generation history).

use axum::extract::{Path, Query, State};
use axum::Json;
use modiste_core::error::CoreError;
use modiste_core::types::DbId;
use modiste_db::models::generated_image::{kinds, GeneratedImage, ImageFilter};
use modiste_db::repositories::GeneratedImageRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::page_window;
use crate::response::{DataResponse, MessageResponse, PagedResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageListParams {
    #[serde(alias = "project_id")]
    pub project_id: Option<DbId>,
    pub favorite: Option<bool>,
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
}

/// Body for `PATCH /images/{id}/favorite`. An empty object toggles.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub is_favorite: Option<bool>,
}

/// GET /api/images
pub async fn list_images(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ImageListParams>,
) -> AppResult<Json<PagedResponse<GeneratedImage>>> {
    if let Some(kind) = params.kind.as_deref() {
        if kind != kinds::GENERATION && kind != kinds::TRY_ON {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown image kind '{kind}'"
            ))));
        }
    }
    let filter = ImageFilter {
        project_id: params.project_id,
        favorite: params.favorite,
        kind: params.kind,
    };
    let (limit, offset) = page_window(params.limit, params.offset, params.page);

    let images =
        GeneratedImageRepo::list_for_owner(&state.pool, auth.user_id, &filter, limit, offset)
            .await?;
    let total = GeneratedImageRepo::count_for_owner(&state.pool, auth.user_id, &filter).await?;

    Ok(Json(PagedResponse::new(images, total, limit, offset)))
}

/// GET /api/images/{id}
pub async fn get_image(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<GeneratedImage>>> {
    let image = GeneratedImageRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(image)))
}

/// PATCH /api/images/{id}/favorite
pub async fn set_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<FavoriteRequest>,
) -> AppResult<Json<DataResponse<GeneratedImage>>> {
    let image = GeneratedImageRepo::set_favorite(&state.pool, id, auth.user_id, input.is_favorite)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(image)))
}

/// DELETE /api/images/{id}
pub async fn delete_image(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !GeneratedImageRepo::soft_delete(&state.pool, id, auth.user_id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = auth.user_id, image_id = id, "Image deleted");
    Ok(Json(MessageResponse::new("Image deleted successfully")))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Image",
        id,
    })
}
