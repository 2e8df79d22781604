//! Product listing helpers: variant-level filtering and sort parsing.
//!
//! Product-level filters (category, tag, material, search text) are pushed
//! into SQL by the repository. Size and price live on variants, so those are
//! applied here to the variant lists fetched alongside a page of products.

use crate::error::CoreError;

/// Variant-level filters taken from the listing query string.
#[derive(Debug, Clone, Default)]
pub struct VariantFilter {
    pub size: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
}

impl VariantFilter {
    /// Build a filter, rejecting an inverted or negative price range.
    pub fn new(
        size: Option<String>,
        min_price_cents: Option<i64>,
        max_price_cents: Option<i64>,
    ) -> Result<Self, CoreError> {
        if min_price_cents.is_some_and(|p| p < 0) || max_price_cents.is_some_and(|p| p < 0) {
            return Err(CoreError::Validation(
                "Price filters must not be negative".into(),
            ));
        }
        if let (Some(min), Some(max)) = (min_price_cents, max_price_cents) {
            if min > max {
                return Err(CoreError::Validation(format!(
                    "min_price ({min}) must not exceed max_price ({max})"
                )));
            }
        }
        let size = size.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Ok(Self {
            size,
            min_price_cents,
            max_price_cents,
        })
    }

    /// Whether any variant-level constraint is set.
    pub fn is_active(&self) -> bool {
        self.size.is_some() || self.min_price_cents.is_some() || self.max_price_cents.is_some()
    }

    /// Test a single variant against every set constraint.
    pub fn matches<V: VariantView>(&self, variant: &V) -> bool {
        if let Some(size) = &self.size {
            match variant.size() {
                Some(s) if s.eq_ignore_ascii_case(size) => {}
                _ => return false,
            }
        }
        let price = variant.price_cents();
        if self.min_price_cents.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price_cents.is_some_and(|max| price > max) {
            return false;
        }
        true
    }
}

/// Read access to the variant fields the filter cares about.
pub trait VariantView {
    fn size(&self) -> Option<&str>;
    fn price_cents(&self) -> i64;
}

/// Keep only the variants that satisfy `filter`.
pub fn filter_variants<V: VariantView>(variants: Vec<V>, filter: &VariantFilter) -> Vec<V> {
    if !filter.is_active() {
        return variants;
    }
    variants.into_iter().filter(|v| filter.matches(v)).collect()
}

/// `(min, max)` price over a variant list, or `None` if it is empty.
pub fn price_range<V: VariantView>(variants: &[V]) -> Option<(i64, i64)> {
    let mut prices = variants.iter().map(VariantView::price_cents);
    let first = prices.next()?;
    Some(prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

/// Sort orders accepted by the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl ProductSort {
    /// Parse the `sort` query parameter. `None` yields [`ProductSort::Newest`].
    pub fn parse(value: Option<&str>) -> Result<Self, CoreError> {
        match value.map(str::trim) {
            None | Some("") | Some("newest") => Ok(Self::Newest),
            Some("price_asc") => Ok(Self::PriceAsc),
            Some("price_desc") => Ok(Self::PriceDesc),
            Some("name_asc") => Ok(Self::NameAsc),
            Some("name_desc") => Ok(Self::NameDesc),
            Some(other) => Err(CoreError::Validation(format!(
                "Unknown sort '{other}'. Must be one of: newest, price_asc, price_desc, name_asc, name_desc"
            ))),
        }
    }

    /// SQL `ORDER BY` fragment for sorts that can run in the database.
    ///
    /// Price sorts depend on filtered variant prices and are applied after
    /// fetching, so they fall back to newest-first here.
    pub fn order_by_sql(self) -> &'static str {
        match self {
            Self::NameAsc => "p.name ASC, p.id ASC",
            Self::NameDesc => "p.name DESC, p.id DESC",
            Self::Newest | Self::PriceAsc | Self::PriceDesc => "p.created_at DESC, p.id DESC",
        }
    }

    pub fn sorts_by_price(self) -> bool {
        matches!(self, Self::PriceAsc | Self::PriceDesc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug, Clone, PartialEq)]
    struct V {
        size: Option<&'static str>,
        price: i64,
    }

    impl VariantView for V {
        fn size(&self) -> Option<&str> {
            self.size
        }
        fn price_cents(&self) -> i64 {
            self.price
        }
    }

    fn variants() -> Vec<V> {
        vec![
            V { size: Some("S"), price: 1000 },
            V { size: Some("M"), price: 1500 },
            V { size: Some("L"), price: 2500 },
            V { size: None, price: 500 },
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = VariantFilter::default();
        assert_eq!(filter_variants(variants(), &filter).len(), 4);
    }

    #[test]
    fn size_filter_is_case_insensitive() {
        let filter = VariantFilter::new(Some("m".into()), None, None).unwrap();
        let kept = filter_variants(variants(), &filter);
        assert_eq!(kept, vec![V { size: Some("M"), price: 1500 }]);
    }

    #[test]
    fn price_range_is_inclusive() {
        let filter = VariantFilter::new(None, Some(1000), Some(1500)).unwrap();
        let kept = filter_variants(variants(), &filter);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_matches!(
            VariantFilter::new(None, Some(2000), Some(1000)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            VariantFilter::new(None, Some(-1), None),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn blank_size_is_ignored() {
        let filter = VariantFilter::new(Some("  ".into()), None, None).unwrap();
        assert!(!filter.is_active());
    }

    #[test]
    fn price_range_of_variants() {
        assert_eq!(price_range(&variants()), Some((500, 2500)));
        assert_eq!(price_range::<V>(&[]), None);
    }

    #[test]
    fn sort_parsing() {
        assert_eq!(ProductSort::parse(None).unwrap(), ProductSort::Newest);
        assert_eq!(ProductSort::parse(Some("price_desc")).unwrap(), ProductSort::PriceDesc);
        assert!(ProductSort::parse(Some("random")).is_err());
        assert!(ProductSort::PriceAsc.sorts_by_price());
        assert!(!ProductSort::NameAsc.sorts_by_price());
    }
}
