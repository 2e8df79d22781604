//! Discount code rules: kinds, applicability window and amount math.

use crate::error::CoreError;
use crate::types::Timestamp;

pub const KIND_PERCENTAGE: &str = "percentage";
pub const KIND_FIXED: &str = "fixed";

/// How a discount's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountKind {
    /// `value` is a whole percentage in `1..=100`.
    Percentage,
    /// `value` is an amount in cents.
    Fixed,
}

impl DiscountKind {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            KIND_PERCENTAGE => Ok(Self::Percentage),
            KIND_FIXED => Ok(Self::Fixed),
            other => Err(CoreError::Validation(format!(
                "Unknown discount type '{other}'. Must be one of: {KIND_PERCENTAGE}, {KIND_FIXED}"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Percentage => KIND_PERCENTAGE,
            Self::Fixed => KIND_FIXED,
        }
    }

    /// Validate `value` for this kind.
    pub fn validate_value(self, value: i64) -> Result<(), CoreError> {
        match self {
            Self::Percentage if !(1..=100).contains(&value) => Err(CoreError::Validation(
                "Percentage discounts must be between 1 and 100".into(),
            )),
            Self::Fixed if value <= 0 => Err(CoreError::Validation(
                "Fixed discounts must be a positive amount".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Normalise a user-entered code for storage and lookup.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Amount taken off `subtotal_cents`, never more than the subtotal itself.
///
/// Percentage discounts round down to the cent.
pub fn compute_discount_cents(kind: DiscountKind, value: i64, subtotal_cents: i64) -> i64 {
    if subtotal_cents <= 0 {
        return 0;
    }
    let raw = match kind {
        DiscountKind::Percentage => subtotal_cents.saturating_mul(value.clamp(0, 100)) / 100,
        DiscountKind::Fixed => value.max(0),
    };
    raw.min(subtotal_cents)
}

/// The subset of a discount row needed to decide if it can be applied.
#[derive(Debug, Clone)]
pub struct DiscountTerms {
    pub is_active: bool,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub min_order_cents: i64,
}

/// Check that a discount can be applied to an order of `subtotal_cents` at `now`.
pub fn check_applicable(
    terms: &DiscountTerms,
    subtotal_cents: i64,
    now: Timestamp,
) -> Result<(), CoreError> {
    if !terms.is_active {
        return Err(CoreError::Validation("Discount code is not active".into()));
    }
    if terms.starts_at.is_some_and(|s| s > now) {
        return Err(CoreError::Validation("Discount code is not yet valid".into()));
    }
    if terms.ends_at.is_some_and(|e| e <= now) {
        return Err(CoreError::Validation("Discount code has expired".into()));
    }
    if terms.max_uses.is_some_and(|max| terms.used_count >= max) {
        return Err(CoreError::Validation(
            "Discount code has reached its usage limit".into(),
        ));
    }
    if subtotal_cents < terms.min_order_cents {
        return Err(CoreError::Validation(format!(
            "Order subtotal must be at least {} to use this code",
            crate::money::format_cents(terms.min_order_cents)
        )));
    }
    Ok(())
}

/// Validate that a discount window is not inverted.
pub fn validate_window(
    starts_at: Option<Timestamp>,
    ends_at: Option<Timestamp>,
) -> Result<(), CoreError> {
    if let (Some(s), Some(e)) = (starts_at, ends_at) {
        if e <= s {
            return Err(CoreError::Validation(
                "ends_at must be after starts_at".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    fn terms() -> DiscountTerms {
        DiscountTerms {
            is_active: true,
            starts_at: None,
            ends_at: None,
            max_uses: None,
            used_count: 0,
            min_order_cents: 0,
        }
    }

    #[test]
    fn percentage_rounds_down() {
        assert_eq!(compute_discount_cents(DiscountKind::Percentage, 15, 999), 149);
        assert_eq!(compute_discount_cents(DiscountKind::Percentage, 100, 2500), 2500);
    }

    #[test]
    fn discount_is_capped_at_subtotal() {
        assert_eq!(compute_discount_cents(DiscountKind::Fixed, 5000, 1200), 1200);
        assert_eq!(compute_discount_cents(DiscountKind::Fixed, 500, 0), 0);
    }

    #[test]
    fn value_validation() {
        assert!(DiscountKind::Percentage.validate_value(0).is_err());
        assert!(DiscountKind::Percentage.validate_value(101).is_err());
        assert!(DiscountKind::Percentage.validate_value(25).is_ok());
        assert!(DiscountKind::Fixed.validate_value(0).is_err());
        assert!(DiscountKind::Fixed.validate_value(1).is_ok());
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [DiscountKind::Percentage, DiscountKind::Fixed] {
            assert_eq!(DiscountKind::from_name(kind.name()).unwrap(), kind);
        }
        assert!(DiscountKind::from_name("bogo").is_err());
    }

    #[test]
    fn applicability_window() {
        let now = Utc::now();
        let mut t = terms();
        assert!(check_applicable(&t, 1000, now).is_ok());

        t.starts_at = Some(now + Duration::hours(1));
        assert_matches!(check_applicable(&t, 1000, now), Err(CoreError::Validation(_)));

        t.starts_at = Some(now - Duration::hours(2));
        t.ends_at = Some(now - Duration::hours(1));
        assert_matches!(check_applicable(&t, 1000, now), Err(CoreError::Validation(_)));
    }

    #[test]
    fn usage_limit_and_minimum() {
        let now = Utc::now();
        let mut t = terms();
        t.max_uses = Some(3);
        t.used_count = 3;
        assert!(check_applicable(&t, 1000, now).is_err());

        let mut t = terms();
        t.min_order_cents = 5000;
        assert!(check_applicable(&t, 4999, now).is_err());
        assert!(check_applicable(&t, 5000, now).is_ok());

        let mut t = terms();
        t.is_active = false;
        assert!(check_applicable(&t, 1000, now).is_err());
    }

    #[test]
    fn codes_are_upper_cased() {
        assert_eq!(normalize_code("  summer10 "), "SUMMER10");
    }

    #[test]
    fn inverted_window_rejected() {
        let now = Utc::now();
        assert!(validate_window(Some(now), Some(now - Duration::days(1))).is_err());
        assert!(validate_window(Some(now), None).is_ok());
    }
}
