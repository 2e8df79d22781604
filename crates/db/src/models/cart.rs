//! Shopping cart models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::cart::MAX_LINE_QUANTITY;
use utoipa::ToSchema;
use validator::Validate;

/// A row from the `carts` table. One per user, created on first use.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `cart_items` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub variant_id: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cart item joined with variant, product and main image.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct CartLine {
    pub id: i64,
    pub variant_id: i64,
    pub quantity: i32,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub product_id: i64,
    pub product_name: String,
    pub product_slug: String,
    pub main_image_url: Option<String>,
    pub line_total_cents: i64,
}

/// `GET /cart` payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartView {
    pub cart_id: i64,
    pub items: Vec<CartLine>,
    pub item_count: i64,
    pub subtotal_cents: i64,
}

impl CartView {
    pub fn new(cart_id: i64, items: Vec<CartLine>) -> Self {
        let item_count = items.iter().map(|l| i64::from(l.quantity)).sum();
        let subtotal_cents = items.iter().map(|l| l.line_total_cents).sum();
        Self {
            cart_id,
            items,
            item_count,
            subtotal_cents,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddCartItem {
    pub variant_id: i64,
    #[validate(range(min = 1, max = MAX_LINE_QUANTITY))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItem {
    #[validate(range(min = 1, max = MAX_LINE_QUANTITY))]
    pub quantity: i32,
}
