//! Postgres-backed [`ImportSink`] for the CSV product import.

use async_trait::async_trait;
use sqlx::PgPool;
use storefront_core::category_tree::MAX_CATEGORY_DEPTH;
use storefront_core::error::CoreError;
use storefront_core::import::{ImportSink, ProductImportRow};
use storefront_core::slug::slugify;
use storefront_core::types::DbId;

use crate::models::category::CreateCategory;
use crate::models::product::CreateVariant;
use crate::repositories::{CategoryRepo, ProductRepo, TagRepo, VariantRepo};

const MAX_SLUG_ATTEMPTS: u32 = 20;

/// Writes each imported row straight to the pool, one statement at a time.
pub struct PgImportSink {
    pool: PgPool,
}

impl PgImportSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a `Parent > Child` path to the leaf id, creating missing levels.
    ///
    /// New categories get a slug built from the whole path so equal names
    /// under different parents stay distinct.
    async fn resolve_category(&self, path: &[String]) -> Result<DbId, CoreError> {
        if path.len() > MAX_CATEGORY_DEPTH {
            return Err(CoreError::Validation(format!(
                "Category path is deeper than {MAX_CATEGORY_DEPTH} levels"
            )));
        }

        let mut parent: Option<DbId> = None;
        for (depth, name) in path.iter().enumerate() {
            let existing = CategoryRepo::find_child_by_name(&self.pool, parent, name)
                .await
                .map_err(db_error)?;
            let id = match existing {
                Some(category) => category.id,
                None => {
                    let slug = slugify(&path[..=depth].join(" "));
                    self.create_segment(name, parent, &slug).await?
                }
            };
            parent = Some(id);
        }

        parent.ok_or_else(|| CoreError::Validation("Missing required field 'category'".into()))
    }

    /// Create one path segment under `parent`.
    ///
    /// A slug held by a category elsewhere in the tree (an admin-made
    /// `Men > Shoes` owns `shoes`) gets a numeric suffix. A slug held by the
    /// very segment we wanted means another writer created it first.
    async fn create_segment(
        &self,
        name: &str,
        parent: Option<DbId>,
        base_slug: &str,
    ) -> Result<DbId, CoreError> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = if attempt == 1 {
                base_slug.to_string()
            } else {
                format!("{base_slug}-{attempt}")
            };
            let input = CreateCategory {
                name: name.to_string(),
                slug: None,
                parent_id: parent,
                description: None,
                sort_order: None,
                is_active: None,
            };
            match CategoryRepo::create(&self.pool, &input, &slug).await {
                Ok(category) => return Ok(category.id),
                Err(e) if crate::is_unique_violation(&e) => {
                    let holder = CategoryRepo::find_by_slug(&self.pool, &slug)
                        .await
                        .map_err(db_error)?;
                    if let Some(holder) = holder {
                        if holder.parent_id == parent && holder.name.eq_ignore_ascii_case(name) {
                            return Ok(holder.id);
                        }
                    }
                }
                Err(e) => return Err(db_error(e)),
            }
        }

        Err(CoreError::Conflict(format!(
            "No free slug for category '{name}' (tried '{base_slug}' and {} suffixes)",
            MAX_SLUG_ATTEMPTS - 1
        )))
    }

    async fn resolve_product(&self, row: &ProductImportRow, category_id: DbId) -> Result<DbId, CoreError> {
        let slug = slugify(&row.name);
        if let Some(product) = ProductRepo::find_by_slug(&self.pool, &slug)
            .await
            .map_err(db_error)?
        {
            return Ok(product.id);
        }
        let product = ProductRepo::create_basic(
            &self.pool,
            category_id,
            &row.name,
            &slug,
            row.description.as_deref(),
            row.material.as_deref(),
        )
        .await
        .map_err(db_error)?;
        Ok(product.id)
    }
}

#[async_trait]
impl ImportSink for PgImportSink {
    async fn import_row(&mut self, row: &ProductImportRow) -> Result<(), CoreError> {
        if VariantRepo::sku_exists(&self.pool, &row.sku)
            .await
            .map_err(db_error)?
        {
            return Err(CoreError::Conflict(format!("SKU '{}' already exists", row.sku)));
        }

        let category_id = self.resolve_category(&row.category_path).await?;
        let product_id = self.resolve_product(row, category_id).await?;

        let variant = CreateVariant {
            sku: row.sku.clone(),
            size: row.size.clone(),
            color: row.color.clone(),
            price_cents: row.price_cents,
            stock: row.stock,
            is_active: None,
        };
        VariantRepo::create(&self.pool, product_id, &variant)
            .await
            .map_err(|e| {
                if crate::is_unique_violation(&e) {
                    CoreError::Conflict(format!("SKU '{}' already exists", row.sku))
                } else {
                    db_error(e)
                }
            })?;

        for tag in &row.tags {
            let slug = slugify(tag);
            if slug.is_empty() {
                continue;
            }
            let tag = TagRepo::find_or_create(&self.pool, tag, &slug)
                .await
                .map_err(db_error)?;
            ProductRepo::add_tag(&self.pool, product_id, tag.id)
                .await
                .map_err(db_error)?;
        }

        tracing::debug!(line = row.line, sku = %row.sku, product_id, "Imported product row");
        Ok(())
    }
}

fn db_error(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("Database error: {e}"))
}
