//! URL slug generation for categories, products and tags.

/// Lower-case `input`, keep ASCII alphanumerics, and collapse every other
/// run of characters into a single `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Use the caller-provided slug when present and non-blank, otherwise derive
/// one from `name`.
pub fn slug_or_derive(slug: Option<&str>, name: &str) -> String {
    match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => slugify(s),
        None => slugify(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_separators() {
        assert_eq!(slugify("Men's  Running -- Shoes"), "men-s-running-shoes");
        assert_eq!(slugify("  Summer Sale!  "), "summer-sale");
        assert_eq!(slugify("T-Shirts & Tops"), "t-shirts-tops");
    }

    #[test]
    fn explicit_slug_wins() {
        assert_eq!(slug_or_derive(Some("Custom Slug"), "Name"), "custom-slug");
        assert_eq!(slug_or_derive(Some("   "), "Fallback Name"), "fallback-name");
        assert_eq!(slug_or_derive(None, "Fallback Name"), "fallback-name");
    }
}
