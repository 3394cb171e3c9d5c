//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                  - Product listing (home page)
//! GET  /health            - Health check
//! GET  /health/ready      - Readiness check (pings the database)
//!
//! # Products
//! GET  /products/{id}     - Product detail
//!
//! # Cart (HTMX fragments, requires auth)
//! GET  /cart              - Cart page
//! POST /cart/add          - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update       - Update quantity (returns cart_items fragment)
//! POST /cart/remove       - Remove line (returns cart_items fragment)
//! GET  /cart/count        - Cart count badge (fragment)
//! POST /cart/checkout     - Place the order, redirect to /orders
//!
//! # Orders (requires auth)
//! GET  /orders            - Order history, newest first
//!
//! # Auth
//! GET  /auth/login        - Login page
//! POST /auth/login        - Login action
//! GET  /auth/register     - Register page
//! POST /auth/register     - Register action
//! POST /auth/logout       - Logout action
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::cart::CartRepository;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Shared page chrome: who is logged in and how many units their cart holds.
#[derive(Clone)]
pub struct Nav {
    pub user: Option<CurrentUser>,
    pub cart_count: i64,
}

impl Nav {
    /// Nav for an anonymous visitor.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            user: None,
            cart_count: 0,
        }
    }
}

/// Build the nav for a page render.
///
/// A count failure degrades to zero rather than failing the page.
pub async fn nav(state: &AppState, user: Option<CurrentUser>) -> Nav {
    let cart_count = match &user {
        Some(current) => CartRepository::new(state.pool())
            .item_count(current.id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to count cart items: {e}");
                0
            }),
        None => 0,
    };

    Nav { user, cart_count }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Product listing is the home page
        .route("/", get(products::index))
        .route("/products/{id}", get(products::show))
        // Cart routes
        .nest("/cart", cart_routes())
        // Order history
        .route("/orders", get(orders::index))
        // Auth routes
        .nest("/auth", auth_routes())
}
