//! Order status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// The storefront itself only ever writes `pending` (while the checkout
/// sequence is in flight) and `completed` (once every step has succeeded).
/// `shipped` and `cancelled` exist because back-office tooling may set them;
/// the storefront renders them but never writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Checkout sequence started but not yet finished. A lingering pending
    /// order is the detectable marker of a partially failed checkout.
    #[default]
    Pending,
    /// Checkout finished; order lines written and cart cleared.
    Completed,
    /// Set externally by fulfilment tooling.
    Shipped,
    /// Set externally.
    Cancelled,
}

impl OrderStatus {
    /// Lowercase label for display and logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Shipped => "shipped",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "shipped" => Ok(Self::Shipped),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Completed,
            OrderStatus::Shipped,
            OrderStatus::Cancelled,
        ] {
            let parsed: OrderStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!("refunded".parse::<OrderStatus>().is_err());
    }
}
