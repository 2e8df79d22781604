//! Repository for the `discounts` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::discount::{CreateDiscount, Discount, UpdateDiscount};

const COLUMNS: &str = "id, code, description, kind, value, min_order_cents, max_uses, \
                        used_count, starts_at, ends_at, is_active, created_at, updated_at";

pub struct DiscountRepo;

impl DiscountRepo {
    /// Insert a discount. `code` must already be normalized.
    pub async fn create(
        pool: &PgPool,
        code: &str,
        input: &CreateDiscount,
    ) -> Result<Discount, sqlx::Error> {
        let query = format!(
            "INSERT INTO discounts
                (code, description, kind, value, min_order_cents, max_uses, starts_at, ends_at, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7, $8, COALESCE($9, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Discount>(&query)
            .bind(code)
            .bind(&input.description)
            .bind(&input.kind)
            .bind(input.value)
            .bind(input.min_order_cents)
            .bind(input.max_uses)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Discount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM discounts WHERE id = $1");
        sqlx::query_as::<_, Discount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Look up by normalized (upper-case) code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Discount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM discounts WHERE code = $1");
        sqlx::query_as::<_, Discount>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Discount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM discounts ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Discount>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDiscount,
    ) -> Result<Option<Discount>, sqlx::Error> {
        let query = format!(
            "UPDATE discounts SET
                description = COALESCE($2, description),
                kind = COALESCE($3, kind),
                value = COALESCE($4, value),
                min_order_cents = COALESCE($5, min_order_cents),
                max_uses = COALESCE($6, max_uses),
                starts_at = COALESCE($7, starts_at),
                ends_at = COALESCE($8, ends_at),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Discount>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(&input.kind)
            .bind(input.value)
            .bind(input.min_order_cents)
            .bind(input.max_uses)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
