//! Order history types.
//!
//! Orders and their lines are written once by the checkout sequencer and
//! never mutated by the storefront afterwards. The `price` on a line is the
//! unit price frozen at checkout time; later catalog price changes do not
//! alter historical orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use sundry_core::{OrderId, OrderLineId, OrderStatus, Price, ProductId};

/// A past order with its line snapshots.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Sum of line price x quantity at creation time.
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Line snapshots, joined with current product name/image for display.
    pub lines: Vec<OrderLine>,
}

/// A frozen snapshot of one product at the time the order was placed.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Product name (from the join; display only).
    pub name: String,
    /// Product image (from the join; display only).
    pub image_url: String,
    /// Unit price captured at checkout time.
    pub price: Price,
    pub quantity: i32,
}

impl OrderLine {
    /// Line total at the frozen unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_uses_frozen_price() {
        let line = OrderLine {
            id: OrderLineId::new(1),
            order_id: OrderId::new(1),
            product_id: ProductId::new(1),
            name: "candle".to_string(),
            image_url: String::new(),
            price: Price::new(Decimal::new(550, 2)),
            quantity: 3,
        };
        assert_eq!(line.line_total(), Decimal::new(1650, 2));
    }
}
