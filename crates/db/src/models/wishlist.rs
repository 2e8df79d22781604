//! Wishlist models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Wishlist row joined with variant and product data.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct WishlistEntry {
    pub id: i64,
    pub variant_id: i64,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub product_id: i64,
    pub product_name: String,
    pub product_slug: String,
    pub main_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddWishlistItem {
    #[validate(range(min = 1))]
    pub variant_id: i64,
}

/// Result of an add: `created` is `false` when the variant was already saved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WishlistAddResult {
    pub variant_id: i64,
    pub created: bool,
}
