//! Product, variant and image models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::catalog::VariantView;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::tag::ProductTag;

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub material: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry: product plus the variants that survived filtering.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductSummary {
    #[serde(flatten)]
    pub product: Product,
    pub main_image_url: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub variants: Vec<ProductVariant>,
}

/// Full product page payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<ProductImage>,
    pub tags: Vec<ProductTag>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    pub category_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Derived from `name` when omitted.
    #[validate(length(min = 1, max = 220))]
    pub slug: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 120))]
    pub material: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    #[validate(nested)]
    pub variants: Option<Vec<CreateVariant>>,
    pub tag_ids: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 220))]
    pub slug: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 120))]
    pub material: Option<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Query string accepted by `GET /products`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProductListParams {
    /// Includes products in every descendant category.
    pub category_id: Option<i64>,
    /// Tag slug.
    pub tag: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    /// Minimum variant price in cents.
    pub min_price: Option<i64>,
    /// Maximum variant price in cents.
    pub max_price: Option<i64>,
    /// Case-insensitive match on name and description.
    pub search: Option<String>,
    pub featured: Option<bool>,
    /// `newest` | `price_asc` | `price_desc` | `name_asc` | `name_desc`
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// SQL-side product filters after parameter parsing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category_ids: Option<Vec<i64>>,
    pub tag_slug: Option<String>,
    pub material: Option<String>,
    pub search: Option<String>,
    pub featured: Option<bool>,
    /// Hide inactive products (public listing).
    pub active_only: bool,
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

/// A row from the `product_variants` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VariantView for ProductVariant {
    fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }
    fn price_cents(&self) -> i64 {
        self.price_cents
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVariant {
    #[validate(length(min = 1, max = 64))]
    pub sku: String,
    #[validate(length(max = 20))]
    pub size: Option<String>,
    #[validate(length(max = 40))]
    pub color: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateVariant {
    #[validate(length(min = 1, max = 64))]
    pub sku: Option<String>,
    #[validate(length(max = 20))]
    pub size: Option<String>,
    #[validate(length(max = 40))]
    pub color: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Option<i64>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

/// Variant joined with its product, used by cart and checkout.
#[derive(Debug, Clone, FromRow)]
pub struct VariantWithProduct {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_is_active: bool,
    pub sku: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// A row from the `product_images` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub storage_path: String,
    pub url: String,
    pub alt_text: Option<String>,
    pub is_main: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a stored image.
#[derive(Debug, Clone)]
pub struct CreateProductImage {
    pub product_id: i64,
    pub storage_path: String,
    pub url: String,
    pub alt_text: Option<String>,
}
