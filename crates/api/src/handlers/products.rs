//! Handlers for the `/products` resource (the caller's garment catalog).
//!
//! Deleting a product deactivates it: it disappears from listings and can
//! no longer be edited or used, but a direct lookup still returns it with
//! `isActive: false`.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use modiste_core::catalog::{
    normalize_tags, parse_tag_list, validate_product_name, validate_upload, ProductType,
};
use modiste_core::error::CoreError;
use modiste_core::types::DbId;
use modiste_db::models::product::{CreateProduct, Product, ProductFilter, UpdateProduct};
use modiste_db::repositories::ProductRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::query::page_window;
use crate::response::{DataResponse, MessageResponse, PagedResponse};
use crate::state::AppState;

/// Sub-directory of the upload root that garment images are written to.
const PRODUCT_UPLOAD_SUBDIR: &str = "products";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Text fields collected from the create form.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    product_type: Option<String>,
    category: Option<String>,
    description: Option<String>,
    tags: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/products
///
/// Active products only, newest first.
pub async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ProductListParams>,
) -> AppResult<Json<PagedResponse<Product>>> {
    let product_type = params
        .product_type
        .as_deref()
        .map(ProductType::parse)
        .transpose()?
        .map(|t| t.as_str().to_string());
    let filter = ProductFilter {
        product_type,
        category: non_empty(params.category),
        tag: non_empty(params.tag).map(|t| t.to_lowercase()),
        search: non_empty(params.search),
    };
    let (limit, offset) = page_window(params.limit, params.offset, params.page);

    let products =
        ProductRepo::list_for_owner(&state.pool, auth.user_id, &filter, limit, offset).await?;
    let total = ProductRepo::count_for_owner(&state.pool, auth.user_id, &filter).await?;

    Ok(Json(PagedResponse::new(products, total, limit, offset)))
}

/// POST /api/products
///
/// Multipart form with a required `image` file and `name` and `type` fields.
/// Optional: `category`, `description` and `tags` (comma-separated).
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" | "file" => {
                let content_type = field.content_type().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.file = Some((content_type, data.to_vec()));
            }
            "name" | "type" | "category" | "description" | "tags" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let slot = match name.as_str() {
                    "name" => &mut form.name,
                    "type" => &mut form.product_type,
                    "category" => &mut form.category,
                    "description" => &mut form.description,
                    _ => &mut form.tags,
                };
                *slot = Some(text);
            }
            _ => {} // ignore unknown fields
        }
    }

    let (content_type, data) = form
        .file
        .ok_or_else(|| AppError::BadRequest("Missing required 'image' field".into()))?;
    let name = validate_product_name(form.name.as_deref().unwrap_or(""))?;
    let product_type = ProductType::parse(
        form.product_type.as_deref().ok_or_else(|| {
            AppError::Core(CoreError::Validation("Product type is required".into()))
        })?,
    )?;
    let tags = parse_tag_list(form.tags.as_deref().unwrap_or(""))?;
    let upload = validate_upload(&content_type, &data, state.config.upload_max_bytes)?;

    let storage_dir = state.config.upload_dir.join(PRODUCT_UPLOAD_SUBDIR);
    tokio::fs::create_dir_all(&storage_dir)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let stored_filename = format!("{}.{}", uuid::Uuid::new_v4(), upload.extension);
    let file_path = storage_dir.join(&stored_filename);
    tokio::fs::write(&file_path, &data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let input = CreateProduct {
        owner_id: auth.user_id,
        name,
        product_type: product_type.as_str().to_string(),
        category: non_empty(form.category),
        description: non_empty(form.description),
        image_url: format!("/uploads/{PRODUCT_UPLOAD_SUBDIR}/{stored_filename}"),
        width: i32::try_from(upload.width).ok(),
        height: i32::try_from(upload.height).ok(),
        tags,
    };

    let product = match ProductRepo::create(&state.pool, &input).await {
        Ok(product) => product,
        Err(e) => {
            // Don't leave an orphaned file behind.
            if let Err(rm) = tokio::fs::remove_file(&file_path).await {
                tracing::warn!(path = %file_path.display(), error = %rm, "Failed to remove upload");
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        user_id = auth.user_id,
        product_id = product.id,
        bytes = data.len(),
        "Product created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(product))))
}

/// GET /api/products/{id}
///
/// Includes deactivated products.
pub async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = ProductRepo::find_by_id(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(product)))
}

/// PUT /api/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateProductRequest>,
) -> AppResult<Json<DataResponse<Product>>> {
    let update = UpdateProduct {
        name: input
            .name
            .as_deref()
            .map(validate_product_name)
            .transpose()?,
        product_type: input
            .product_type
            .as_deref()
            .map(ProductType::parse)
            .transpose()?
            .map(|t| t.as_str().to_string()),
        category: input.category,
        description: input.description,
        tags: input.tags.map(normalize_tags).transpose()?,
    };

    let product = ProductRepo::update(&state.pool, id, auth.user_id, &update)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(product)))
}

/// POST /api/products/{id}/use
///
/// Record that the product was placed on the canvas.
pub async fn use_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = ProductRepo::increment_usage(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse::new(product)))
}

/// DELETE /api/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<MessageResponse>> {
    if !ProductRepo::deactivate(&state.pool, id, auth.user_id).await? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = auth.user_id, product_id = id, "Product deactivated");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
