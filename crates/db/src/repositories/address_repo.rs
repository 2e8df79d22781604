//! Repository for the `addresses` table.
//!
//! At most one address per user has `is_default = true`; every write that
//! can change the default runs in a transaction that clears the old one
//! first (the partial unique index would reject the overlap otherwise).

use sqlx::PgPool;
use storefront_core::types::DbId;

use crate::models::address::{Address, CreateAddress, UpdateAddress};

const COLUMNS: &str = "id, user_id, label, recipient_name, line1, line2, city, state, \
                        postal_code, country, phone, is_default, created_at, updated_at";

pub struct AddressRepo;

impl AddressRepo {
    /// A user's addresses, default first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Address>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM addresses WHERE user_id = $1
             ORDER BY is_default DESC, created_at DESC"
        );
        sqlx::query_as::<_, Address>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find an address only if it belongs to `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Address>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM addresses WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an address. The first address a user saves becomes the default.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateAddress,
    ) -> Result<Address, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        let make_default = existing == 0 || input.is_default.unwrap_or(false);

        if make_default {
            sqlx::query("UPDATE addresses SET is_default = false WHERE user_id = $1 AND is_default")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!(
            "INSERT INTO addresses
                (user_id, label, recipient_name, line1, line2, city, state, postal_code, country, phone, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        let address = sqlx::query_as::<_, Address>(&query)
            .bind(user_id)
            .bind(&input.label)
            .bind(&input.recipient_name)
            .bind(&input.line1)
            .bind(&input.line2)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.postal_code)
            .bind(&input.country)
            .bind(&input.phone)
            .bind(make_default)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(address)
    }

    /// Partial update of an owned address.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateAddress,
    ) -> Result<Option<Address>, sqlx::Error> {
        let query = format!(
            "UPDATE addresses SET
                label = COALESCE($3, label),
                recipient_name = COALESCE($4, recipient_name),
                line1 = COALESCE($5, line1),
                line2 = COALESCE($6, line2),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                postal_code = COALESCE($9, postal_code),
                country = COALESCE($10, country),
                phone = COALESCE($11, phone)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.label)
            .bind(&input.recipient_name)
            .bind(&input.line1)
            .bind(&input.line2)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.postal_code)
            .bind(&input.country)
            .bind(&input.phone)
            .fetch_optional(pool)
            .await
    }

    /// Make an owned address the default. Returns `None` if it is not found.
    pub async fn set_default(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Address>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE addresses SET is_default = false
             WHERE user_id = $1 AND is_default AND id <> $2",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE addresses SET is_default = true
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        let address = sqlx::query_as::<_, Address>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        match address {
            Some(a) => {
                tx.commit().await?;
                Ok(Some(a))
            }
            None => {
                tx.rollback().await?;
                Ok(None)
            }
        }
    }

    /// Delete an owned address. If it was the default, the most recent
    /// remaining address takes over.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let was_default: Option<bool> = sqlx::query_scalar(
            "DELETE FROM addresses WHERE id = $1 AND user_id = $2 RETURNING is_default",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_default) = was_default else {
            tx.rollback().await?;
            return Ok(false);
        };

        if was_default {
            sqlx::query(
                "UPDATE addresses SET is_default = true
                 WHERE id = (
                    SELECT id FROM addresses WHERE user_id = $1
                    ORDER BY created_at DESC, id DESC LIMIT 1
                 )",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
