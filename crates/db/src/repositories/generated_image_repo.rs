//! Repository for the `generated_images` table.
//!
//! Images are soft-deleted via `is_deleted`; deleted rows never appear in
//! lookups or listings.

use modiste_core::types::DbId;
use sqlx::PgPool;

use crate::models::generated_image::{GeneratedImage, ImageFilter, NewGeneratedImage};
use crate::repositories::PgTx;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, project_id, url, prompt, image_size, width, height, kind, \
                       model_info, style_info, provider_request_id, credits_used, \
                       is_favorite, is_deleted, created_at";

/// Provides CRUD operations for generated images.
pub struct GeneratedImageRepo;

impl GeneratedImageRepo {
    /// Insert a batch of images inside an open transaction.
    pub async fn create_batch_in_tx(
        tx: &mut PgTx<'_>,
        owner_id: DbId,
        images: &[NewGeneratedImage],
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_images
                (owner_id, project_id, url, prompt, image_size, width, height, kind,
                 model_info, style_info, provider_request_id, credits_used)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );

        let mut created = Vec::with_capacity(images.len());
        for image in images {
            let row = sqlx::query_as::<_, GeneratedImage>(&query)
                .bind(owner_id)
                .bind(image.project_id)
                .bind(&image.url)
                .bind(&image.prompt)
                .bind(&image.image_size)
                .bind(image.width)
                .bind(image.height)
                .bind(image.kind)
                .bind(&image.model_info)
                .bind(&image.style_info)
                .bind(&image.provider_request_id)
                .bind(image.credits_used)
                .fetch_one(&mut **tx)
                .await?;
            created.push(row);
        }
        Ok(created)
    }

    /// Insert a batch of images in a transaction of its own.
    pub async fn create_batch(
        pool: &PgPool,
        owner_id: DbId,
        images: &[NewGeneratedImage],
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = Self::create_batch_in_tx(&mut tx, owner_id, images).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Find an owner's image by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE id = $1 AND owner_id = $2 AND is_deleted = false"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's images, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        filter: &ImageFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generated_images
             WHERE owner_id = $1
               AND is_deleted = false
               AND ($2::BIGINT IS NULL OR project_id = $2)
               AND ($3::BOOLEAN IS NULL OR is_favorite = $3)
               AND ($4::TEXT IS NULL OR kind = $4)
             ORDER BY created_at DESC, id DESC
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(owner_id)
            .bind(filter.project_id)
            .bind(filter.favorite)
            .bind(&filter.kind)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count an owner's live images matching the filter.
    pub async fn count_for_owner(
        pool: &PgPool,
        owner_id: DbId,
        filter: &ImageFilter,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM generated_images
             WHERE owner_id = $1
               AND is_deleted = false
               AND ($2::BIGINT IS NULL OR project_id = $2)
               AND ($3::BOOLEAN IS NULL OR is_favorite = $3)
               AND ($4::TEXT IS NULL OR kind = $4)",
        )
        .bind(owner_id)
        .bind(filter.project_id)
        .bind(filter.favorite)
        .bind(&filter.kind)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Set the favorite flag, or toggle it when `favorite` is `None`.
    pub async fn set_favorite(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        favorite: Option<bool>,
    ) -> Result<Option<GeneratedImage>, sqlx::Error> {
        let query = format!(
            "UPDATE generated_images SET is_favorite = COALESCE($3, NOT is_favorite)
             WHERE id = $1 AND owner_id = $2 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedImage>(&query)
            .bind(id)
            .bind(owner_id)
            .bind(favorite)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an image. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generated_images SET is_deleted = true
             WHERE id = $1 AND owner_id = $2 AND is_deleted = false",
        )
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
