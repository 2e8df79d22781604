//! Repository for the `orders` and `order_items` tables.

use sqlx::PgPool;
use storefront_core::order::STATUS_CANCELLED;
use storefront_core::types::DbId;

use crate::models::order::{CheckoutOutcome, NewOrder, Order, OrderDetail, OrderItem};

const COLUMNS: &str = "id, user_id, status, subtotal_cents, discount_cents, shipping_cents, \
                        total_cents, discount_id, discount_code, ship_recipient_name, ship_line1, \
                        ship_line2, ship_city, ship_state, ship_postal_code, ship_country, \
                        ship_phone, notes, cancelled_at, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, variant_id, product_id, product_name, sku, size, color, \
                             unit_price_cents, quantity, line_total_cents, created_at";

pub struct OrderRepo;

impl OrderRepo {
    /// Place an order from a prepared cart snapshot.
    ///
    /// In one transaction: claim a discount use, decrement stock with a
    /// `stock >= qty` guard per line, insert the order and its items, and
    /// empty the cart. Any guard that matches no row rolls everything back.
    pub async fn checkout(pool: &PgPool, input: &NewOrder) -> Result<CheckoutOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if let Some(discount_id) = input.discount_id {
            let claimed = sqlx::query(
                "UPDATE discounts SET used_count = used_count + 1
                 WHERE id = $1 AND is_active AND (max_uses IS NULL OR used_count < max_uses)",
            )
            .bind(discount_id)
            .execute(&mut *tx)
            .await?;
            if claimed.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(CheckoutOutcome::DiscountExhausted);
            }
        }

        for item in &input.items {
            let updated = sqlx::query(
                "UPDATE product_variants SET stock = stock - $2 WHERE id = $1 AND stock >= $2",
            )
            .bind(item.variant_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
            if updated.rows_affected() == 0 {
                tx.rollback().await?;
                return Ok(CheckoutOutcome::InsufficientStock {
                    sku: item.sku.clone(),
                });
            }
        }

        let query = format!(
            "INSERT INTO orders (
                user_id, subtotal_cents, discount_cents, shipping_cents, total_cents,
                discount_id, discount_code, ship_recipient_name, ship_line1, ship_line2,
                ship_city, ship_state, ship_postal_code, ship_country, ship_phone, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {COLUMNS}"
        );
        let addr = &input.address;
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(input.user_id)
            .bind(input.subtotal_cents)
            .bind(input.discount_cents)
            .bind(input.shipping_cents)
            .bind(input.total_cents)
            .bind(input.discount_id)
            .bind(&input.discount_code)
            .bind(&addr.recipient_name)
            .bind(&addr.line1)
            .bind(&addr.line2)
            .bind(&addr.city)
            .bind(&addr.state)
            .bind(&addr.postal_code)
            .bind(&addr.country)
            .bind(&addr.phone)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        let item_query = format!(
            "INSERT INTO order_items (
                order_id, variant_id, product_id, product_name, sku, size, color,
                unit_price_cents, quantity, line_total_cents)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ITEM_COLUMNS}"
        );
        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let row = sqlx::query_as::<_, OrderItem>(&item_query)
                .bind(order.id)
                .bind(item.variant_id)
                .bind(item.product_id)
                .bind(&item.product_name)
                .bind(&item.sku)
                .bind(&item.size)
                .bind(&item.color)
                .bind(item.unit_price_cents)
                .bind(item.quantity)
                .bind(item.line_total_cents())
                .fetch_one(&mut *tx)
                .await?;
            items.push(row);
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(input.cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CheckoutOutcome::Placed(OrderDetail { order, items }))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// An order, only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn items(pool: &PgPool, order_id: DbId) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id");
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(pool)
            .await
    }

    /// Orders newest first, optionally for one user and/or one status.
    pub async fn list(
        pool: &PgPool,
        user_id: Option<DbId>,
        status: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM orders
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Order>(&query)
            .bind(user_id)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Move an order from `from` to `to`.
    ///
    /// Returns `None` when the order is no longer in `from` (a concurrent
    /// change won). Cancelling restores stock and releases the discount use.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: &str,
        to: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE orders SET
                status = $3,
                cancelled_at = CASE WHEN $3 = '{STATUS_CANCELLED}' THEN NOW() ELSE cancelled_at END
             WHERE id = $1 AND status = $2
             RETURNING {COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(from)
            .bind(to)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            tx.rollback().await?;
            return Ok(None);
        };

        if to == STATUS_CANCELLED {
            sqlx::query(
                "UPDATE product_variants v SET stock = v.stock + oi.quantity
                 FROM order_items oi
                 WHERE oi.order_id = $1 AND oi.variant_id = v.id",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;

            if let Some(discount_id) = order.discount_id {
                sqlx::query(
                    "UPDATE discounts SET used_count = GREATEST(used_count - 1, 0) WHERE id = $1",
                )
                .bind(discount_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(order))
    }
}
