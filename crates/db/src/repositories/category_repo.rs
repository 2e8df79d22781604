//! Repository for the `categories` table.
//!
//! Hierarchy rules (no cycles, depth limit, delete guards) are evaluated in
//! `storefront_core::category_tree` against the projection returned by
//! [`CategoryRepo::links`]; this module only reads and writes rows.

use sqlx::PgPool;
use storefront_core::category_tree::CategoryLink;
use storefront_core::types::DbId;

use crate::models::category::{Category, CreateCategory, UpdateCategory};

const COLUMNS: &str = "id, parent_id, name, slug, description, image_path, image_url, \
                        sort_order, is_active, created_at, updated_at";

pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateCategory,
        slug: &str,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (parent_id, name, slug, description, sort_order, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(input.parent_id)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Every category, ordered for display.
    pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE ($1 = false OR is_active)
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    /// Direct children of `parent_id`.
    pub async fn list_children(
        pool: &PgPool,
        parent_id: DbId,
        active_only: bool,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE parent_id = $1 AND ($2 = false OR is_active)
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(parent_id)
            .bind(active_only)
            .fetch_all(pool)
            .await
    }

    /// `(id, parent_id)` for every category.
    pub async fn links(pool: &PgPool) -> Result<Vec<CategoryLink>, sqlx::Error> {
        let rows: Vec<(DbId, Option<DbId>)> =
            sqlx::query_as("SELECT id, parent_id FROM categories")
                .fetch_all(pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(id, parent_id)| CategoryLink { id, parent_id })
            .collect())
    }

    /// Partial update. `input.parent_id = Some(None)` moves the category to
    /// the root.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
        slug: Option<&str>,
    ) -> Result<Option<Category>, sqlx::Error> {
        let (parent_changed, new_parent) = match input.parent_id {
            Some(parent) => (true, parent),
            None => (false, None),
        };
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                parent_id = CASE WHEN $4 THEN $5 ELSE parent_id END,
                description = COALESCE($6, description),
                sort_order = COALESCE($7, sort_order),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(slug)
            .bind(parent_changed)
            .bind(new_parent)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_children(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn count_products(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a category. Returns the removed row so its image can be cleaned up.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("DELETE FROM categories WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Point the category at a new stored image, returning the previous key.
    pub async fn set_image(
        pool: &PgPool,
        id: DbId,
        path: Option<&str>,
        url: Option<&str>,
    ) -> Result<Option<(Category, Option<String>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT image_path FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(previous) = previous else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!(
            "UPDATE categories SET image_path = $2, image_url = $3 WHERE id = $1 RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(path)
            .bind(url)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((category, previous)))
    }

    /// Find a category by name, case-insensitively, under `parent_id` (root
    /// when `None`).
    pub async fn find_child_by_name(
        pool: &PgPool,
        parent_id: Option<DbId>,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE parent_id IS NOT DISTINCT FROM $1 AND lower(name) = lower($2)
             LIMIT 1"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(parent_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Every stored image key referenced by a category.
    pub async fn image_paths(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT image_path FROM categories WHERE image_path IS NOT NULL")
            .fetch_all(pool)
            .await
    }
}
