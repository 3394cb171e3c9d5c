//! Integration tests for checkout snapshots and step reporting.

use rust_decimal::Decimal;

use sundry_core::{CartLineId, OrderId, Price, ProductId};
use sundry_storefront::db::RepositoryError;
use sundry_storefront::models::cart::CartLine;
use sundry_storefront::services::checkout::{CheckoutError, order_lines_from_cart};

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

// =============================================================================
// Line Snapshots
// =============================================================================

#[test]
fn test_snapshot_freezes_unit_price() {
    let lines = vec![line(1, 1999, 3)];
    let snapshot = order_lines_from_cart(&lines);

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].product_id, ProductId::new(1));
    assert_eq!(snapshot[0].quantity, 3);
    // The snapshot carries the price at checkout time, not a reference
    assert_eq!(snapshot[0].price, Price::new(Decimal::new(1999, 2)));
}

#[test]
fn test_snapshot_preserves_line_order() {
    let lines = vec![line(3, 100, 1), line(1, 200, 1), line(2, 300, 1)];
    let snapshot = order_lines_from_cart(&lines);

    let ids: Vec<i32> = snapshot.iter().map(|l| l.product_id.as_i32()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

// =============================================================================
// Step Reporting
// =============================================================================

#[test]
fn test_each_failure_names_its_step() {
    let order_id = OrderId::new(1);

    assert_eq!(
        CheckoutError::LoadCart(RepositoryError::NotFound).step(),
        "load-cart"
    );
    assert_eq!(CheckoutError::EmptyCart.step(), "empty-cart");
    assert_eq!(
        CheckoutError::CreateOrder(RepositoryError::NotFound).step(),
        "create-order"
    );
    assert_eq!(
        CheckoutError::CreateOrderLines {
            order_id,
            source: RepositoryError::NotFound
        }
        .step(),
        "order-lines"
    );
    assert_eq!(
        CheckoutError::ClearCart {
            order_id,
            source: RepositoryError::NotFound
        }
        .step(),
        "clear-cart"
    );
    assert_eq!(
        CheckoutError::CompleteOrder {
            order_id,
            source: RepositoryError::NotFound
        }
        .step(),
        "complete-order"
    );
}

#[test]
fn test_post_order_failures_name_the_order() {
    let err = CheckoutError::CompleteOrder {
        order_id: OrderId::new(99),
        source: RepositoryError::NotFound,
    };
    assert!(err.to_string().contains("99"));
}
