//! Repository for the `product_images` table.
//!
//! A product has at most one main image. The first image uploaded for a
//! product becomes main; deleting the main image promotes the next one.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::product::{CreateProductImage, ProductImage};

const COLUMNS: &str = "id, product_id, storage_path, url, alt_text, is_main, sort_order, \
                        created_at, updated_at";

pub struct ProductImageRepo;

impl ProductImageRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProductImage,
    ) -> Result<ProductImage, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_images (product_id, storage_path, url, alt_text, is_main, sort_order)
             VALUES (
                $1, $2, $3, $4,
                NOT EXISTS (SELECT 1 FROM product_images WHERE product_id = $1 AND is_main),
                COALESCE((SELECT MAX(sort_order) + 1 FROM product_images WHERE product_id = $1), 0)
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(input.product_id)
            .bind(&input.storage_path)
            .bind(&input.url)
            .bind(&input.alt_text)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProductImage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM product_images WHERE id = $1");
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ProductImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_images WHERE product_id = $1
             ORDER BY is_main DESC, sort_order, id"
        );
        sqlx::query_as::<_, ProductImage>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// `(product_id, url)` of the main image for each listed product.
    pub async fn main_urls(
        pool: &PgPool,
        product_ids: &[DbId],
    ) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as(
            "SELECT product_id, url FROM product_images WHERE product_id = ANY($1) AND is_main",
        )
        .bind(product_ids)
        .fetch_all(pool)
        .await
    }

    /// Delete an image, promoting the next one if it was main.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<ProductImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("DELETE FROM product_images WHERE id = $1 RETURNING {COLUMNS}");
        let deleted = sqlx::query_as::<_, ProductImage>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref image) = deleted {
            if image.is_main {
                sqlx::query(
                    "UPDATE product_images SET is_main = true
                     WHERE id = (
                        SELECT id FROM product_images WHERE product_id = $1
                        ORDER BY sort_order, id LIMIT 1
                     )",
                )
                .bind(image.product_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(deleted)
    }

    /// Make `id` the product's main image.
    pub async fn set_main(pool: &PgPool, id: DbId) -> Result<Option<ProductImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let product_id: Option<DbId> =
            sqlx::query_scalar("SELECT product_id FROM product_images WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(product_id) = product_id else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query(
            "UPDATE product_images SET is_main = false
             WHERE product_id = $1 AND is_main AND id <> $2",
        )
        .bind(product_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE product_images SET is_main = true WHERE id = $1 RETURNING {COLUMNS}"
        );
        let image = sqlx::query_as::<_, ProductImage>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(image))
    }

    /// Every stored key referenced by a product image.
    pub async fn storage_paths(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT storage_path FROM product_images")
            .fetch_all(pool)
            .await
    }
}
