//! Category hierarchy model and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storefront_core::category_tree::{CategoryLink, TreeItem};
use utoipa::ToSchema;
use validator::Validate;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Object storage key of the category image.
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreeItem for Category {
    fn id(&self) -> i64 {
        self.id
    }
    fn parent_id(&self) -> Option<i64> {
        self.parent_id
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl From<&Category> for CategoryLink {
    fn from(c: &Category) -> Self {
        CategoryLink {
            id: c.id,
            parent_id: c.parent_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Derived from `name` when omitted.
    #[validate(length(min = 1, max = 140))]
    pub slug: Option<String>,
    pub parent_id: Option<i64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 140))]
    pub slug: Option<String>,
    /// `null` moves the category to the root; omit to keep the parent.
    #[serde(default, deserialize_with = "crate::models::double_option")]
    #[schema(value_type = Option<i64>)]
    pub parent_id: Option<Option<i64>>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}
