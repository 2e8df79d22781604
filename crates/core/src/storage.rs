//! Object key layout and orphan detection for uploaded files.

use std::collections::HashSet;

use crate::types::DbId;

/// Key prefix for product images.
pub const PRODUCT_PREFIX: &str = "products";

/// Key prefix for category images.
pub const CATEGORY_PREFIX: &str = "categories";

/// Prefixes swept by the orphan cleanup.
pub const MANAGED_PREFIXES: &[&str] = &[PRODUCT_PREFIX, CATEGORY_PREFIX];

/// Build a fresh object key: `{prefix}/{owner_id}/{uuid}.{ext}`.
pub fn object_key(prefix: &str, owner_id: DbId, extension: &str) -> String {
    format!("{prefix}/{owner_id}/{}.{extension}", uuid::Uuid::new_v4())
}

/// Keys present in storage but not referenced by any row.
///
/// The result is sorted so previews are stable between calls.
pub fn find_orphans<S, R>(stored: S, referenced: R) -> Vec<String>
where
    S: IntoIterator<Item = String>,
    R: IntoIterator<Item = String>,
{
    let referenced: HashSet<String> = referenced.into_iter().collect();
    let mut orphans: Vec<String> = stored
        .into_iter()
        .filter(|key| !referenced.contains(key))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    orphans.sort();
    orphans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_layout() {
        let key = object_key(PRODUCT_PREFIX, 42, "jpg");
        let parts: Vec<&str> = key.split('/').collect();
        assert_eq!(parts[0], "products");
        assert_eq!(parts[1], "42");
        assert!(parts[2].ends_with(".jpg"));
        assert_ne!(key, object_key(PRODUCT_PREFIX, 42, "jpg"));
    }

    #[test]
    fn orphans_are_stored_minus_referenced() {
        let stored = vec![
            "products/1/a.jpg".to_string(),
            "products/1/b.jpg".to_string(),
            "categories/3/c.png".to_string(),
            "products/1/a.jpg".to_string(),
        ];
        let referenced = vec!["products/1/a.jpg".to_string(), "products/9/gone.jpg".to_string()];
        assert_eq!(
            find_orphans(stored, referenced),
            vec!["categories/3/c.png".to_string(), "products/1/b.jpg".to_string()]
        );
    }

    #[test]
    fn nothing_stored_means_no_orphans() {
        assert!(find_orphans(Vec::new(), vec!["products/1/a.jpg".to_string()]).is_empty());
    }
}
