//! Product tag model and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ProductTag {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTag {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[validate(length(min = 1, max = 80))]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTag {
    #[validate(length(min = 1, max = 60))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub slug: Option<String>,
}

/// Replacement tag set for a product.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SetProductTags {
    #[validate(length(max = 50))]
    pub tag_ids: Vec<i64>,
}
