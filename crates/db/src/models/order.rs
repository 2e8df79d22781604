//! Order models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::address::Address;

/// A row from the `orders` table. The shipping address is a snapshot.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: String,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub discount_id: Option<i64>,
    pub discount_code: Option<String>,
    pub ship_recipient_name: String,
    pub ship_line1: String,
    pub ship_line2: Option<String>,
    pub ship_city: String,
    pub ship_state: Option<String>,
    pub ship_postal_code: String,
    pub ship_country: String,
    pub ship_phone: Option<String>,
    pub notes: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `order_items` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub variant_id: Option<i64>,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Inline shipping address for checkout.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ShippingAddressInput {
    #[validate(length(min = 1, max = 200))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 200))]
    pub line1: String,
    #[validate(length(max = 200))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(max = 100))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub postal_code: String,
    #[validate(length(min = 2, max = 56))]
    pub country: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
}

impl From<Address> for ShippingAddressInput {
    fn from(a: Address) -> Self {
        Self {
            recipient_name: a.recipient_name,
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
            phone: a.phone,
        }
    }
}

/// `POST /orders` body. Exactly one of `shipping_address_id` and
/// `shipping_address` must be given.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    pub shipping_address_id: Option<i64>,
    #[validate(nested)]
    pub shipping_address: Option<ShippingAddressInput>,
    #[validate(length(min = 1, max = 40))]
    pub discount_code: Option<String>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatus {
    #[validate(length(min = 1))]
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct OrderListParams {
    /// Filter by status name.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One order line prepared by checkout.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub variant_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

impl NewOrderItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Everything checkout writes in its transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub cart_id: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    pub discount_id: Option<i64>,
    pub discount_code: Option<String>,
    pub address: ShippingAddressInput,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// Result of the checkout transaction.
#[derive(Debug)]
pub enum CheckoutOutcome {
    Placed(OrderDetail),
    /// A guarded stock decrement matched no row; nothing was written.
    InsufficientStock { sku: String },
    /// The discount hit its usage limit between validation and commit.
    DiscountExhausted,
}
