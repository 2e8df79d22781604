//! Query parameter types shared by several handler modules.

use serde::Deserialize;
use storefront_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use utoipa::IntoParams;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` clamped to the page-size bounds.
    pub fn clamped(&self) -> (i64, i64) {
        page(self.limit, self.offset)
    }
}

/// Clamp raw `limit`/`offset` values from any query struct.
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        clamp_offset(offset),
    )
}

/// `?skip_errors=` for the CSV import.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ImportParams {
    /// Keep going past invalid rows instead of stopping at the first one.
    #[serde(default)]
    pub skip_errors: bool,
}
