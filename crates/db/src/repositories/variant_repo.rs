//! Repository for the `product_variants` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::product::{CreateVariant, ProductVariant, UpdateVariant, VariantWithProduct};

const COLUMNS: &str = "id, product_id, sku, size, color, price_cents, stock, is_active, \
                        created_at, updated_at";

pub struct VariantRepo;

impl VariantRepo {
    pub async fn create(
        pool: &PgPool,
        product_id: DbId,
        input: &CreateVariant,
    ) -> Result<ProductVariant, sqlx::Error> {
        let query = format!(
            "INSERT INTO product_variants (product_id, sku, size, color, price_cents, stock, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductVariant>(&query)
            .bind(product_id)
            .bind(&input.sku)
            .bind(&input.size)
            .bind(&input.color)
            .bind(input.price_cents)
            .bind(input.stock)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProductVariant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM product_variants WHERE id = $1");
        sqlx::query_as::<_, ProductVariant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn sku_exists(pool: &PgPool, sku: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM product_variants WHERE sku = $1)")
            .bind(sku)
            .fetch_one(pool)
            .await
    }

    /// Variant with the product fields cart and checkout need.
    pub async fn find_with_product(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<VariantWithProduct>, sqlx::Error> {
        sqlx::query_as::<_, VariantWithProduct>(
            "SELECT v.id, v.product_id, p.name AS product_name, p.is_active AS product_is_active,
                    v.sku, v.size, v.color, v.price_cents, v.stock, v.is_active
             FROM product_variants v
             JOIN products p ON p.id = v.product_id
             WHERE v.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// All variants of one product.
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<ProductVariant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM product_variants WHERE product_id = $1 ORDER BY price_cents, id"
        );
        sqlx::query_as::<_, ProductVariant>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Variants of many products in one round trip.
    pub async fn list_for_products(
        pool: &PgPool,
        product_ids: &[DbId],
        active_only: bool,
    ) -> Result<Vec<ProductVariant>, sqlx::Error> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM product_variants
             WHERE product_id = ANY($1) AND ($2 = false OR is_active)
             ORDER BY product_id, price_cents, id"
        );
        sqlx::query_as::<_, ProductVariant>(&query)
            .bind(product_ids)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVariant,
    ) -> Result<Option<ProductVariant>, sqlx::Error> {
        let query = format!(
            "UPDATE product_variants SET
                sku = COALESCE($2, sku),
                size = COALESCE($3, size),
                color = COALESCE($4, color),
                price_cents = COALESCE($5, price_cents),
                stock = COALESCE($6, stock),
                is_active = COALESCE($7, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductVariant>(&query)
            .bind(id)
            .bind(&input.sku)
            .bind(&input.size)
            .bind(&input.color)
            .bind(input.price_cents)
            .bind(input.stock)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM product_variants WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
