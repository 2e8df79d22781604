//! Repository for the `wishlist_items` table.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::wishlist::WishlistEntry;

pub struct WishlistRepo;

impl WishlistRepo {
    /// Save a variant. Returns `false` if it was already on the list.
    pub async fn add(pool: &PgPool, user_id: DbId, variant_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO wishlist_items (user_id, variant_id) VALUES ($1, $2)
             ON CONFLICT (user_id, variant_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(variant_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(pool: &PgPool, user_id: DbId) -> Result<Vec<WishlistEntry>, sqlx::Error> {
        sqlx::query_as::<_, WishlistEntry>(
            "SELECT w.id, w.variant_id, v.sku, v.size, v.color, v.price_cents, v.stock,
                    p.id AS product_id, p.name AS product_name, p.slug AS product_slug,
                    img.url AS main_image_url, w.created_at
             FROM wishlist_items w
             JOIN product_variants v ON v.id = w.variant_id
             JOIN products p ON p.id = v.product_id
             LEFT JOIN product_images img ON img.product_id = p.id AND img.is_main
             WHERE w.user_id = $1
             ORDER BY w.created_at DESC, w.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn remove(pool: &PgPool, user_id: DbId, variant_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND variant_id = $2")
            .bind(user_id)
            .bind(variant_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
