//! Order status machine and checkout totals.

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_PAID: &str = "paid";
pub const STATUS_SHIPPED: &str = "shipped";
pub const STATUS_DELIVERED: &str = "delivered";
pub const STATUS_CANCELLED: &str = "cancelled";

/// Lifecycle state of an order, stored as text in `orders.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_PAID => Ok(Self::Paid),
            STATUS_SHIPPED => Ok(Self::Shipped),
            STATUS_DELIVERED => Ok(Self::Delivered),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown order status '{other}'"
            ))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Paid => STATUS_PAID,
            Self::Shipped => STATUS_SHIPPED,
            Self::Delivered => STATUS_DELIVERED,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Allowed forward transitions.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Shipped)
                | (Paid, Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// Orders a customer may still cancel themselves.
    pub fn is_cancellable(self) -> bool {
        self.can_transition_to(OrderStatus::Cancelled)
    }
}

/// Validate moving an order from `current` to `next`.
pub fn check_transition(current: OrderStatus, next: OrderStatus) -> Result<(), CoreError> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot change order status from '{}' to '{}'",
            current.name(),
            next.name()
        )))
    }
}

/// Shipping policy applied at checkout.
#[derive(Debug, Clone, Copy)]
pub struct ShippingPolicy {
    pub flat_cents: i64,
    /// Subtotals at or above this ship free. `None` disables free shipping.
    pub free_threshold_cents: Option<i64>,
}

/// Monetary breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
}

/// Compute totals from line amounts, an already-capped discount and the policy.
///
/// The free-shipping threshold is checked against the pre-discount subtotal.
pub fn compute_totals(
    line_totals: impl IntoIterator<Item = i64>,
    discount_cents: i64,
    shipping: ShippingPolicy,
) -> OrderTotals {
    let subtotal_cents: i64 = line_totals.into_iter().sum();
    let discount_cents = discount_cents.clamp(0, subtotal_cents.max(0));
    let shipping_cents = match shipping.free_threshold_cents {
        Some(threshold) if subtotal_cents >= threshold => 0,
        _ => shipping.flat_cents.max(0),
    };
    OrderTotals {
        subtotal_cents,
        discount_cents,
        shipping_cents,
        total_cents: subtotal_cents - discount_cents + shipping_cents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn happy_path_transitions() {
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Paid).is_ok());
        assert!(check_transition(OrderStatus::Paid, OrderStatus::Shipped).is_ok());
        assert!(check_transition(OrderStatus::Shipped, OrderStatus::Delivered).is_ok());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for next in ALL {
            assert!(!OrderStatus::Delivered.can_transition_to(next));
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn shipped_orders_cannot_be_cancelled() {
        assert!(OrderStatus::Pending.is_cancellable());
        assert!(OrderStatus::Paid.is_cancellable());
        assert!(!OrderStatus::Shipped.is_cancellable());
        assert_matches!(
            check_transition(OrderStatus::Shipped, OrderStatus::Cancelled),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn status_names_round_trip() {
        for status in ALL {
            assert_eq!(OrderStatus::from_name(status.name()).unwrap(), status);
        }
        assert!(OrderStatus::from_name("lost").is_err());
    }

    #[test]
    fn totals_with_flat_shipping() {
        let policy = ShippingPolicy { flat_cents: 499, free_threshold_cents: Some(10_000) };
        let totals = compute_totals([2000, 1500], 500, policy);
        assert_eq!(
            totals,
            OrderTotals {
                subtotal_cents: 3500,
                discount_cents: 500,
                shipping_cents: 499,
                total_cents: 3499,
            }
        );
    }

    #[test]
    fn totals_with_free_shipping_and_oversized_discount() {
        let policy = ShippingPolicy { flat_cents: 499, free_threshold_cents: Some(3000) };
        let totals = compute_totals([3000], 9999, policy);
        assert_eq!(totals.shipping_cents, 0);
        assert_eq!(totals.discount_cents, 3000);
        assert_eq!(totals.total_cents, 0);
    }
}
