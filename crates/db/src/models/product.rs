//! Product (garment) entity model and DTOs.

use modiste_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub product_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub tags: Vec<String>,
    pub usage_count: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a product after its image has been stored.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub owner_id: DbId,
    pub name: String,
    pub product_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image_url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub tags: Vec<String>,
}

/// DTO for updating a product. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Optional filters for product listings.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub product_type: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub search: Option<String>,
}
