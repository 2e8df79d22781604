//! Repository for the `carts` and `cart_items` tables.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::cart::{Cart, CartItem, CartLine};

const CART_COLUMNS: &str = "id, user_id, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, cart_id, variant_id, quantity, created_at, updated_at";

pub struct CartRepo;

impl CartRepo {
    /// The user's cart, created on first use.
    pub async fn get_or_create(pool: &PgPool, user_id: DbId) -> Result<Cart, sqlx::Error> {
        let query = format!(
            "INSERT INTO carts (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING {CART_COLUMNS}"
        );
        sqlx::query_as::<_, Cart>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Cart lines with variant, product and main image data.
    pub async fn lines(pool: &PgPool, cart_id: DbId) -> Result<Vec<CartLine>, sqlx::Error> {
        sqlx::query_as::<_, CartLine>(
            "SELECT ci.id, ci.variant_id, ci.quantity,
                    v.sku, v.size, v.color, v.price_cents, v.stock,
                    p.id AS product_id, p.name AS product_name, p.slug AS product_slug,
                    img.url AS main_image_url,
                    v.price_cents * ci.quantity AS line_total_cents
             FROM cart_items ci
             JOIN product_variants v ON v.id = ci.variant_id
             JOIN products p ON p.id = v.product_id
             LEFT JOIN product_images img ON img.product_id = p.id AND img.is_main
             WHERE ci.cart_id = $1
             ORDER BY ci.created_at, ci.id",
        )
        .bind(cart_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_item(
        pool: &PgPool,
        cart_id: DbId,
        variant_id: DbId,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM cart_items WHERE cart_id = $1 AND variant_id = $2"
        );
        sqlx::query_as::<_, CartItem>(&query)
            .bind(cart_id)
            .bind(variant_id)
            .fetch_optional(pool)
            .await
    }

    /// A cart item, only if it sits in `user_id`'s cart.
    pub async fn find_item_for_user(
        pool: &PgPool,
        item_id: DbId,
        user_id: DbId,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            "SELECT ci.id, ci.cart_id, ci.variant_id, ci.quantity, ci.created_at, ci.updated_at
             FROM cart_items ci
             JOIN carts c ON c.id = ci.cart_id
             WHERE ci.id = $1 AND c.user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Plain insert. Fails with a unique violation if a concurrent request
    /// added the same variant first.
    pub async fn insert_item(
        pool: &PgPool,
        cart_id: DbId,
        variant_id: DbId,
        quantity: i32,
    ) -> Result<CartItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO cart_items (cart_id, variant_id, quantity) VALUES ($1, $2, $3)
             RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, CartItem>(&query)
            .bind(cart_id)
            .bind(variant_id)
            .bind(quantity)
            .fetch_one(pool)
            .await
    }

    pub async fn set_quantity(
        pool: &PgPool,
        item_id: DbId,
        quantity: i32,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        let query = format!(
            "UPDATE cart_items SET quantity = $2 WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        );
        sqlx::query_as::<_, CartItem>(&query)
            .bind(item_id)
            .bind(quantity)
            .fetch_optional(pool)
            .await
    }

    /// Remove one item from `user_id`'s cart.
    pub async fn delete_item(pool: &PgPool, item_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM cart_items ci USING carts c
             WHERE ci.cart_id = c.id AND ci.id = $1 AND c.user_id = $2",
        )
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Empty the cart. Returns the number of removed items.
    pub async fn clear(pool: &PgPool, cart_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
