//! Business logic services for the storefront.
//!
//! - `auth` - User registration and login (email + password)
//! - `checkout` - Converts a cart into an order through a fixed step sequence

pub mod auth;
pub mod checkout;
