//! Integration tests for cart aggregation and view mapping.
//!
//! These verify the cart math and display formatting without requiring
//! a live database.

use rust_decimal::Decimal;

use sundry_core::{CartLineId, Price, ProductId};
use sundry_storefront::models::cart::{Cart, CartLine, MIN_QUANTITY, accepts_quantity};
use sundry_storefront::routes::cart::CartView;

fn line(id: i32, price_cents: i64, quantity: i32) -> CartLine {
    CartLine {
        id: CartLineId::new(id),
        product_id: ProductId::new(id),
        name: format!("product-{id}"),
        image_url: format!("https://images.sundry.example/{id}.jpg"),
        price: Price::new(Decimal::new(price_cents, 2)),
        quantity,
        stock: 100,
    }
}

// =============================================================================
// Cart Math
// =============================================================================

#[test]
fn test_subtotal_sums_line_totals() {
    // $10.00 x2 + $5.50 x1 = $25.50
    let cart = Cart::new(vec![line(1, 1000, 2), line(2, 550, 1)]);
    assert_eq!(cart.subtotal(), Decimal::new(2550, 2));
}

#[test]
fn test_item_count_sums_quantities_not_lines() {
    let cart = Cart::new(vec![line(1, 1000, 2), line(2, 550, 3)]);
    assert_eq!(cart.item_count(), 5);
    assert_eq!(cart.lines.len(), 2);
}

#[test]
fn test_empty_cart_is_a_normal_state() {
    let cart = Cart::empty();
    assert!(cart.is_empty());
    assert_eq!(cart.subtotal(), Decimal::ZERO);
    assert_eq!(cart.item_count(), 0);
}

// =============================================================================
// Quantity Floor
// =============================================================================

#[test]
fn test_quantity_floor_is_one() {
    assert_eq!(MIN_QUANTITY, 1);
    assert!(!accepts_quantity(0));
    assert!(!accepts_quantity(-5));
    assert!(accepts_quantity(1));
    assert!(accepts_quantity(99));
}

// =============================================================================
// View Mapping
// =============================================================================

#[test]
fn test_cart_view_formats_prices() {
    let cart = Cart::new(vec![line(1, 1000, 2), line(2, 550, 1)]);
    let view = CartView::from(&cart);

    assert_eq!(view.subtotal, "$25.50");
    assert_eq!(view.item_count, 3);
    assert_eq!(view.items[0].price, "$10.00");
    assert_eq!(view.items[0].line_total, "$20.00");
    assert_eq!(view.items[1].line_total, "$5.50");
}

#[test]
fn test_empty_cart_view() {
    let view = CartView::empty();
    assert!(view.items.is_empty());
    assert_eq!(view.subtotal, "$0.00");
    assert_eq!(view.item_count, 0);
}
