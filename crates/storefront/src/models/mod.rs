//! Domain models for the storefront.

pub mod cart;
pub mod order;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine, MIN_QUANTITY, accepts_quantity};
pub use order::{Order, OrderLine};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
