//! Sundry Core - Shared types library.
//!
//! This crate provides common types used across all Sundry components:
//! - `storefront` - Customer-facing shop
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
