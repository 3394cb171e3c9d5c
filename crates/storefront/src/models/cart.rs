//! Cart aggregation.
//!
//! A cart is a transient projection: the rows live in `shop.cart_items` and
//! everything derived (line totals, subtotal, item count) is computed here,
//! never stored.

use rust_decimal::Decimal;

use sundry_core::{CartLineId, Price, ProductId};

/// Smallest quantity a cart line may hold. A requested quantity below this
/// is a silent no-op, never persisted.
pub const MIN_QUANTITY: i32 = 1;

/// Whether a requested quantity may be persisted to a cart line.
#[must_use]
pub const fn accepts_quantity(quantity: i32) -> bool {
    quantity >= MIN_QUANTITY
}

/// One product held in a user's cart, joined with its product row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartLine {
    /// Cart line ID.
    pub id: CartLineId,
    /// Product this line holds.
    pub product_id: ProductId,
    /// Product name (from the join).
    pub name: String,
    /// Product image (from the join).
    pub image_url: String,
    /// Current unit price of the product.
    pub price: Price,
    /// Quantity held; always >= [`MIN_QUANTITY`].
    pub quantity: i32,
    /// Units available for the product.
    pub stock: i32,
}

impl CartLine {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}

/// A user's cart with derived totals.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    /// Enriched cart lines, in insertion order.
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Wrap fetched lines.
    #[must_use]
    pub const fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// An empty cart. A normal state, not an error.
    #[must_use]
    pub const fn empty() -> Self {
        Self { lines: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price_cents: i64, quantity: i32) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            product_id: ProductId::new(id),
            name: format!("product-{id}"),
            image_url: String::new(),
            price: Price::new(Decimal::new(price_cents, 2)),
            quantity,
            stock: 100,
        }
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::empty();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(1, 1000, 2).line_total(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_two_line_cart_totals() {
        // Product A at $10.00 x2, product B at $5.50 x1
        let cart = Cart::new(vec![line(1, 1000, 2), line(2, 550, 1)]);
        assert_eq!(cart.subtotal(), Decimal::new(2550, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_quantity_floor() {
        assert!(!accepts_quantity(0));
        assert!(!accepts_quantity(-1));
        assert!(accepts_quantity(1));
        assert!(accepts_quantity(7));
    }
}
