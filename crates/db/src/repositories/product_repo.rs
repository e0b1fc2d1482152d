//! Repository for the `products` table.
//!
//! Products are soft-deleted via `is_active = false`. Listings only return
//! active rows; a direct lookup by ID still finds a deactivated product so
//! the client can show its final state.

use modiste_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{CreateProduct, Product, ProductFilter, UpdateProduct};
use crate::repositories::PgTx;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, name, product_type, category, description, image_url, \
                       width, height, tags, usage_count, is_active, created_at, updated_at";

/// Shared `WHERE` clause for listing and counting (`$1` = owner).
const LIST_FILTER: &str = "owner_id = $1
               AND is_active = true
               AND ($2::TEXT IS NULL OR product_type = $2)
               AND ($3::TEXT IS NULL OR category = $3)
               AND ($4::TEXT IS NULL OR $4 = ANY(tags))
               AND ($5::TEXT IS NULL OR name ILIKE '%' || $5 || '%')";

/// Provides CRUD operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (owner_id, name, product_type, category, description, image_url,
                 width, height, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.product_type)
            .bind(&input.category)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(input.width)
            .bind(input.height)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    /// Find an owner's product by ID, active or not.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's active products, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE {LIST_FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(owner_id)
            .bind(&filter.product_type)
            .bind(&filter.category)
            .bind(&filter.tag)
            .bind(&filter.search)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count an owner's active products matching the filter.
    pub async fn count_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        filter: &ProductFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM products WHERE {LIST_FILTER}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(owner_id)
            .bind(&filter.product_type)
            .bind(&filter.category)
            .bind(&filter.tag)
            .bind(&filter.search)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Update an active product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no active product with this ID exists for the owner.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        input: &UpdateProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($3, name),
                product_type = COALESCE($4, product_type),
                category = COALESCE($5, category),
                description = COALESCE($6, description),
                tags = COALESCE($7, tags)
             WHERE id = $1 AND owner_id = $2 AND is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&input.name)
            .bind(&input.product_type)
            .bind(&input.category)
            .bind(&input.description)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Bump the usage counter inside an open transaction.
    ///
    /// Returns `None` if no active product with this ID exists for the owner.
    pub async fn increment_usage_in_tx(
        tx: &mut PgTx<'_>,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET usage_count = usage_count + 1
             WHERE id = $1 AND owner_id = $2 AND is_active = true
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Bump the usage counter when a product is placed on the canvas.
    pub async fn increment_usage(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Product>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let product = Self::increment_usage_in_tx(&mut tx, id, owner_id).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Soft-delete a product. Returns `true` if a row was deactivated.
    pub async fn deactivate(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET is_active = false
             WHERE id = $1 AND owner_id = $2 AND is_active = true",
        )
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
