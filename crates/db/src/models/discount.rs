//! Discount code models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::discount::DiscountTerms;
use utoipa::ToSchema;
use validator::Validate;

/// A row from the `discounts` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Discount {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
    /// `percentage` or `fixed`.
    pub kind: String,
    /// Percent (1..=100) or cents, depending on `kind`.
    pub value: i64,
    pub min_order_cents: i64,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discount {
    pub fn terms(&self) -> DiscountTerms {
        DiscountTerms {
            is_active: self.is_active,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            max_uses: self.max_uses,
            used_count: self.used_count,
            min_order_cents: self.min_order_cents,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateDiscount {
    #[validate(length(min = 3, max = 40))]
    pub code: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub kind: String,
    #[validate(range(min = 1))]
    pub value: i64,
    #[validate(range(min = 0))]
    pub min_order_cents: Option<i64>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateDiscount {
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub kind: Option<String>,
    #[validate(range(min = 1))]
    pub value: Option<i64>,
    #[validate(range(min = 0))]
    pub min_order_cents: Option<i64>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// `POST /discounts/validate` body. Without `subtotal_cents` the caller's
/// current cart subtotal is used.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ValidateDiscount {
    #[validate(length(min = 1, max = 40))]
    pub code: String,
    #[validate(range(min = 0))]
    pub subtotal_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiscountQuote {
    pub code: String,
    pub kind: String,
    pub value: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
}
