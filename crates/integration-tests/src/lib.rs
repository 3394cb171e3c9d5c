//! Integration tests for Sundry.
//!
//! The tests under `tests/` exercise storefront library logic that does
//! not need a live database: cart math, checkout snapshots and step
//! reporting, and the core domain types.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sundry-integration-tests
//! ```
