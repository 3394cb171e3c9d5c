//! Integration tests for the core domain types.

#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use rust_decimal::Decimal;

use sundry_core::{Email, OrderStatus, Price, UserId, format_usd};

// =============================================================================
// Price Formatting
// =============================================================================

#[test]
fn test_prices_always_show_cents() {
    assert_eq!(format_usd(Decimal::new(1000, 2)), "$10.00");
    assert_eq!(format_usd(Decimal::from(10)), "$10.00");
    assert_eq!(format_usd(Decimal::new(550, 2)), "$5.50");
    assert_eq!(format_usd(Decimal::ZERO), "$0.00");
}

#[test]
fn test_price_times_quantity() {
    let price = Price::new(Decimal::new(1999, 2));
    assert_eq!(price.times(3), Decimal::new(5997, 2));
}

// =============================================================================
// Order Status
// =============================================================================

#[test]
fn test_order_status_defaults_to_pending() {
    assert_eq!(OrderStatus::default(), OrderStatus::Pending);
}

#[test]
fn test_order_status_string_roundtrip() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ] {
        let parsed = OrderStatus::from_str(status.as_str()).unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_order_status_rejects_unknown() {
    assert!(OrderStatus::from_str("refunded").is_err());
}

// =============================================================================
// Email and IDs
// =============================================================================

#[test]
fn test_email_parsing() {
    assert!(Email::parse("user@example.com").is_ok());
    assert!(Email::parse("").is_err());
    assert!(Email::parse("not-an-email").is_err());
}

#[test]
fn test_ids_serialize_transparently() {
    let id = UserId::new(42);
    assert_eq!(serde_json::to_string(&id).unwrap(), "42");
}
