//! Cart quantity rules.
//!
//! A cart line may never ask for more units than the variant currently has
//! in stock. Stock is re-read on every mutation; nothing is reserved until
//! checkout.

use crate::error::CoreError;

/// Upper bound on a single cart line, independent of stock.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Compute the new line quantity when adding `requested` units to a line
/// that already holds `existing` units.
pub fn resolve_add_quantity(existing: i32, requested: i32, stock: i32) -> Result<i32, CoreError> {
    if requested <= 0 {
        return Err(CoreError::Validation(
            "Quantity must be at least 1".into(),
        ));
    }
    let total = existing.saturating_add(requested);
    check_against_stock(total, stock)?;
    Ok(total)
}

/// Validate an absolute quantity set through `PUT /cart/items/{id}`.
pub fn validate_set_quantity(requested: i32, stock: i32) -> Result<i32, CoreError> {
    if requested <= 0 {
        return Err(CoreError::Validation(
            "Quantity must be at least 1".into(),
        ));
    }
    check_against_stock(requested, stock)?;
    Ok(requested)
}

fn check_against_stock(quantity: i32, stock: i32) -> Result<(), CoreError> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(CoreError::Validation(format!(
            "Quantity cannot exceed {MAX_LINE_QUANTITY} per item"
        )));
    }
    if quantity > stock {
        return Err(CoreError::Conflict(format!(
            "Insufficient stock: available {}, requested {quantity}",
            stock.max(0)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn add_within_stock() {
        assert_eq!(resolve_add_quantity(0, 2, 5).unwrap(), 2);
        assert_eq!(resolve_add_quantity(3, 2, 5).unwrap(), 5);
    }

    #[test]
    fn add_never_exceeds_stock() {
        assert_matches!(resolve_add_quantity(4, 2, 5), Err(CoreError::Conflict(_)));
        assert_matches!(resolve_add_quantity(0, 1, 0), Err(CoreError::Conflict(_)));
        for existing in 0..6 {
            for requested in 1..6 {
                if let Ok(q) = resolve_add_quantity(existing, requested, 5) {
                    assert!(q <= 5);
                }
            }
        }
    }

    #[test]
    fn non_positive_request_is_invalid() {
        assert_matches!(resolve_add_quantity(1, 0, 5), Err(CoreError::Validation(_)));
        assert_matches!(validate_set_quantity(-1, 5), Err(CoreError::Validation(_)));
    }

    #[test]
    fn set_quantity_checks_stock_and_cap() {
        assert_eq!(validate_set_quantity(3, 3).unwrap(), 3);
        assert_matches!(validate_set_quantity(4, 3), Err(CoreError::Conflict(_)));
        assert_matches!(validate_set_quantity(150, 500), Err(CoreError::Validation(_)));
    }
}
