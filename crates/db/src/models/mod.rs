//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for partial updates
//!
//! Row structs spell out `i64` / `DateTime<Utc>` rather than the core aliases
//! so the OpenAPI derive sees the concrete types.

use serde::{Deserialize, Deserializer};

pub mod address;
pub mod cart;
pub mod category;
pub mod contact;
pub mod discount;
pub mod order;
pub mod product;
pub mod session;
pub mod tag;
pub mod user;
pub mod wishlist;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use with `#[serde(default, deserialize_with = "crate::models::double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
