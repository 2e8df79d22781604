//! Request handlers, one module per resource.
//!
//! Handlers delegate to the repositories in `storefront_db` and the pure
//! rules in `storefront_core`, and map failures through [`AppError`].

use storefront_core::error::CoreError;

use crate::error::{AppError, AppResult};

pub mod admin_users;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod contact;
pub mod discounts;
pub mod orders;
pub mod products;
pub mod storage;
pub mod tags;
pub mod users;
pub mod wishlist;

/// Reject a slug that normalized to nothing (e.g. a name made only of
/// punctuation).
pub(crate) fn require_slug(slug: String) -> AppResult<String> {
    if slug.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Slug must contain at least one letter or digit".into(),
        )));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn empty_slug_is_rejected() {
        assert_matches!(
            require_slug(String::new()),
            Err(AppError::Core(CoreError::Validation(_)))
        );
        assert_eq!(require_slug("summer-dress".into()).unwrap(), "summer-dress");
    }
}
