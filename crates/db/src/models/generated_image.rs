//! Generated image model and DTOs.

use modiste_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Output of a generation or try-on, from the `generated_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: DbId,
    pub owner_id: DbId,
    pub project_id: Option<DbId>,
    pub url: String,
    pub prompt: String,
    pub image_size: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub kind: String,
    pub model_info: serde_json::Value,
    pub style_info: serde_json::Value,
    pub provider_request_id: Option<String>,
    pub credits_used: i64,
    pub is_favorite: bool,
    pub is_deleted: bool,
    pub created_at: Timestamp,
}

/// Image kinds stored in `generated_images.kind`.
pub mod kinds {
    pub const GENERATION: &str = "generation";
    pub const TRY_ON: &str = "try_on";
}

/// DTO for inserting one generated image.
#[derive(Debug, Clone)]
pub struct NewGeneratedImage {
    pub project_id: Option<DbId>,
    pub url: String,
    pub prompt: String,
    pub image_size: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub kind: &'static str,
    pub model_info: serde_json::Value,
    pub style_info: serde_json::Value,
    pub provider_request_id: Option<String>,
    pub credits_used: i64,
}

/// Optional filters for image listings.
#[derive(Debug, Clone, Default)]
pub struct ImageFilter {
    pub project_id: Option<DbId>,
    pub favorite: Option<bool>,
    pub kind: Option<String>,
}
