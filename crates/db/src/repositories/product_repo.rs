//! Repository for the `products` and `product_tag_assignments` tables.

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::product::{CreateProduct, Product, ProductFilter, UpdateProduct};

const COLUMNS: &str = "id, category_id, name, slug, description, material, is_active, \
                        is_featured, created_at, updated_at";

/// Same columns qualified with the `p.` alias used by listing queries.
const P_COLUMNS: &str = "p.id, p.category_id, p.name, p.slug, p.description, p.material, \
                          p.is_active, p.is_featured, p.created_at, p.updated_at";

pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product together with its initial variants and tags.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProduct,
        slug: &str,
    ) -> Result<Product, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO products (category_id, name, slug, description, material, is_active, is_featured)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, true), COALESCE($7, false))
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.material)
            .bind(input.is_active)
            .bind(input.is_featured)
            .fetch_one(&mut *tx)
            .await?;

        for variant in input.variants.iter().flatten() {
            sqlx::query(
                "INSERT INTO product_variants (product_id, sku, size, color, price_cents, stock, is_active)
                 VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, true))",
            )
            .bind(product.id)
            .bind(&variant.sku)
            .bind(&variant.size)
            .bind(&variant.color)
            .bind(variant.price_cents)
            .bind(variant.stock)
            .bind(variant.is_active)
            .execute(&mut *tx)
            .await?;
        }

        if let Some(tag_ids) = input.tag_ids.as_deref().filter(|ids| !ids.is_empty()) {
            sqlx::query(
                "INSERT INTO product_tag_assignments (product_id, tag_id)
                 SELECT $1, unnest($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(product.id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    /// Insert a bare product (no variants or tags).
    pub async fn create_basic(
        pool: &PgPool,
        category_id: DbId,
        name: &str,
        slug: &str,
        description: Option<&str>,
        material: Option<&str>,
    ) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products (category_id, name, slug, description, material)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(category_id)
            .bind(name)
            .bind(slug)
            .bind(description)
            .bind(material)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE slug = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List products matching the SQL-side filters.
    ///
    /// `page` is `(limit, offset)`; `None` returns every match so the caller
    /// can filter and sort on variant data before paginating.
    pub async fn list(
        pool: &PgPool,
        filter: &ProductFilter,
        order_by: &str,
        page: Option<(i64, i64)>,
    ) -> Result<Vec<Product>, sqlx::Error> {
        // Build dynamic WHERE clauses.
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        if filter.active_only {
            conditions.push("p.is_active".to_string());
        }
        if filter.category_ids.is_some() {
            conditions.push(format!("p.category_id = ANY(${bind_idx})"));
            bind_idx += 1;
        }
        if filter.tag_slug.is_some() {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM product_tag_assignments pta \
                 JOIN product_tags t ON t.id = pta.tag_id \
                 WHERE pta.product_id = p.id AND t.slug = ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if filter.material.is_some() {
            conditions.push(format!("p.material ILIKE ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.search.is_some() {
            conditions.push(format!(
                "(p.name ILIKE ${bind_idx} OR p.description ILIKE ${bind_idx})"
            ));
            bind_idx += 1;
        }
        if filter.featured.is_some() {
            conditions.push(format!("p.is_featured = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let page_clause = match page {
            Some(_) => format!("LIMIT ${bind_idx} OFFSET ${}", bind_idx + 1),
            None => String::new(),
        };

        let query = format!(
            "SELECT {P_COLUMNS} FROM products p {where_clause} ORDER BY {order_by} {page_clause}"
        );

        let mut q = sqlx::query_as::<_, Product>(&query);

        // Bind dynamic parameters in order.
        if let Some(ref ids) = filter.category_ids {
            q = q.bind(ids.clone());
        }
        if let Some(ref tag) = filter.tag_slug {
            q = q.bind(tag.clone());
        }
        if let Some(ref material) = filter.material {
            q = q.bind(escape_like(material));
        }
        if let Some(ref search) = filter.search {
            q = q.bind(format!("%{}%", escape_like(search)));
        }
        if let Some(featured) = filter.featured {
            q = q.bind(featured);
        }
        if let Some((limit, offset)) = page {
            q = q.bind(limit).bind(offset);
        }

        q.fetch_all(pool).await
    }

    /// Partial update. `slug` overrides the stored slug when given.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProduct,
        slug: Option<&str>,
    ) -> Result<Option<Product>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                category_id = COALESCE($2, category_id),
                name = COALESCE($3, name),
                slug = COALESCE($4, slug),
                description = COALESCE($5, description),
                material = COALESCE($6, material),
                is_active = COALESCE($7, is_active),
                is_featured = COALESCE($8, is_featured)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(input.category_id)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.material)
            .bind(input.is_active)
            .bind(input.is_featured)
            .fetch_optional(pool)
            .await
    }

    /// Delete a product and (by cascade) its variants, images and tag links.
    ///
    /// Returns the storage keys of the removed images, or `None` if the
    /// product did not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let paths: Vec<String> =
            sqlx::query_scalar("SELECT storage_path FROM product_images WHERE product_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }
        tx.commit().await?;
        Ok(Some(paths))
    }

    /// Replace the product's tag set.
    pub async fn set_tags(pool: &PgPool, id: DbId, tag_ids: &[DbId]) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM product_tag_assignments WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                "INSERT INTO product_tag_assignments (product_id, tag_id)
                 SELECT $1, unnest($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(tag_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Attach one tag, ignoring an existing link.
    pub async fn add_tag(pool: &PgPool, id: DbId, tag_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO product_tag_assignments (product_id, tag_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like(" 50%_off "), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
