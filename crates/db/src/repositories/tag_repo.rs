//! Repository for the `product_tags` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::tag::{ProductTag, UpdateTag};

const COLUMNS: &str = "id, name, slug, created_at, updated_at";

pub struct TagRepo;

impl TagRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<ProductTag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM product_tags ORDER BY name");
        sqlx::query_as::<_, ProductTag>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProductTag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM product_tags WHERE id = $1");
        sqlx::query_as::<_, ProductTag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, name: &str, slug: &str) -> Result<ProductTag, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_tags (name, slug) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductTag>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// Return the tag with `slug`, creating it if missing.
    pub async fn find_or_create(
        pool: &PgPool,
        name: &str,
        slug: &str,
    ) -> Result<ProductTag, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_tags (name, slug) VALUES ($1, $2)
             ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductTag>(&query)
            .bind(name)
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTag,
        slug: Option<&str>,
    ) -> Result<Option<ProductTag>, sqlx::Error> {
        let query = format!(
            "UPDATE product_tags SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductTag>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM product_tags WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Tags attached to a product, by name.
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ProductTag>, sqlx::Error> {
        sqlx::query_as::<_, ProductTag>(
            "SELECT t.id, t.name, t.slug, t.created_at, t.updated_at
             FROM product_tags t
             JOIN product_tag_assignments pta ON pta.tag_id = t.id
             WHERE pta.product_id = $1
             ORDER BY t.name",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }
}
