//! Cart route handlers.
//!
//! Cart mutations are HTMX fragments: each one re-renders either the count
//! badge or the cart items block and fires a `cart-updated` trigger so the
//! nav badge stays in sync. Every failed mutation or read surfaces a
//! notice — in the items fragment on the cart page, or out-of-band in the
//! `#cart-notice` region elsewhere — so the user always gets an explicit
//! success or failure signal for the action just attempted.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use sundry_core::{CartLineId, ProductId, format_usd};

use crate::db::cart::CartRepository;
use crate::middleware::RequireAuth;
use crate::models::cart::Cart;
use crate::routes::Nav;
use crate::services::checkout::{CheckoutError, CheckoutService};
use crate::state::AppState;

/// Notice shown when the cart could not be read.
const CART_LOAD_FAILED: &str = "We couldn't load your cart. What you see here may be out of date.";
/// Notice shown when an add-to-cart write failed.
const CART_ADD_FAILED: &str = "We couldn't add that to your cart. Please try again.";
/// Notice shown when a quantity update failed.
const CART_UPDATE_FAILED: &str = "We couldn't update your cart. Please try again.";
/// Notice shown when a line removal failed.
const CART_REMOVE_FAILED: &str = "We couldn't remove that item. Please try again.";
/// Notice shown after a successful add-to-cart.
const CART_ADDED: &str = "Added to cart.";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub line_id: i32,
    pub product_id: i32,
    pub name: String,
    pub image_url: String,
    pub price: String,
    pub line_total: String,
    pub quantity: i32,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: i64,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .lines
                .iter()
                .map(|line| CartItemView {
                    line_id: line.id.as_i32(),
                    product_id: line.product_id.as_i32(),
                    name: line.name.clone(),
                    image_url: line.image_url.clone(),
                    price: line.price.display(),
                    line_total: format_usd(line.line_total()),
                    quantity: line.quantity,
                })
                .collect(),
            subtotal: format_usd(cart.subtotal()),
            item_count: cart.item_count(),
        }
    }
}

/// Out-of-band notice rendered alongside the count badge.
#[derive(Clone, Copy)]
pub struct Notice {
    pub kind: &'static str,
    pub message: &'static str,
}

impl Notice {
    const fn success(message: &'static str) -> Self {
        Self {
            kind: "success",
            message,
        }
    }

    const fn error(message: &'static str) -> Self {
        Self {
            kind: "error",
            message,
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<i32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: i32,
    pub quantity: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: i32,
}

/// Query parameters for the cart page.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    /// Failed checkout step, set by the checkout redirect.
    pub error: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
    pub notice: Option<Notice>,
}

/// Map a failed checkout step to a user-facing message.
fn checkout_error_message(step: &str) -> String {
    match step {
        "empty-cart" => "Your cart is empty.".to_string(),
        "create-order" => "We couldn't create your order. Nothing was charged.".to_string(),
        "order-lines" => "Your order was created but its items couldn't be saved.".to_string(),
        "clear-cart" => {
            "Your order was placed but your cart couldn't be cleared.".to_string()
        }
        "complete-order" => "Your order was placed but couldn't be finalized.".to_string(),
        _ => "Checkout failed. Please try again.".to_string(),
    }
}

/// Load a user's cart, degrading to an empty view plus a notice on failure.
async fn load_cart_view(
    state: &AppState,
    user_id: sundry_core::UserId,
) -> (CartView, Option<String>) {
    match CartRepository::new(state.pool()).lines_for_user(user_id).await {
        Ok(lines) => (CartView::from(&Cart::new(lines)), None),
        Err(e) => {
            tracing::warn!("Failed to fetch cart for user {user_id}: {e}");
            (CartView::empty(), Some(CART_LOAD_FAILED.to_string()))
        }
    }
}

/// Display the cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<CartQuery>,
) -> impl IntoResponse {
    let (cart, load_error) = load_cart_view(&state, user.id).await;
    let error = query
        .error
        .as_deref()
        .map(checkout_error_message)
        .or(load_error);

    let nav = super::nav(&state, Some(user)).await;

    CartShowTemplate { nav, cart, error }
}

/// Add a product to the cart (HTMX).
///
/// Merges into an existing line for the same product or inserts a new one.
/// Returns the count badge plus an out-of-band notice reporting the
/// outcome, with an HTMX trigger to refresh dependents.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let repo = CartRepository::new(state.pool());
    let quantity = form.quantity.unwrap_or(1);

    let notice = match repo
        .add(user.id, ProductId::new(form.product_id), quantity)
        .await
    {
        Ok(()) => Notice::success(CART_ADDED),
        Err(e) => {
            tracing::error!("Failed to add product {} to cart: {e}", form.product_id);
            Notice::error(CART_ADD_FAILED)
        }
    };

    let count = repo.item_count(user.id).await.unwrap_or(0);

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count,
            notice: Some(notice),
        },
    )
        .into_response()
}

/// Update a cart line's quantity (HTMX).
///
/// A quantity below 1 leaves the line untouched; the re-rendered fragment
/// shows the persisted state either way. A write failure renders a notice
/// inside the fragment.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let repo = CartRepository::new(state.pool());

    let mut error = None;
    if let Err(e) = repo
        .set_quantity(user.id, CartLineId::new(form.line_id), form.quantity)
        .await
    {
        tracing::error!("Failed to update cart line {}: {e}", form.line_id);
        error = Some(CART_UPDATE_FAILED.to_string());
    }

    let (cart, load_error) = load_cart_view(&state, user.id).await;
    let error = error.or(load_error);

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart, error },
    )
        .into_response()
}

/// Remove a cart line (HTMX).
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let repo = CartRepository::new(state.pool());

    let mut error = None;
    if let Err(e) = repo.remove(user.id, CartLineId::new(form.line_id)).await {
        tracing::error!("Failed to remove cart line {}: {e}", form.line_id);
        error = Some(CART_REMOVE_FAILED.to_string());
    }

    let (cart, load_error) = load_cart_view(&state, user.id).await;
    let error = error.or(load_error);

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart, error },
    )
        .into_response()
}

/// Get the cart count badge (HTMX).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let count = CartRepository::new(state.pool())
        .item_count(user.id)
        .await
        .unwrap_or(0);

    CartCountTemplate {
        count,
        notice: None,
    }
}

/// Place an order from the cart.
///
/// On success redirects to the order history with a confirmation notice.
/// On failure redirects back to the cart naming the step that failed.
#[instrument(skip(state, user))]
pub async fn checkout(State(state): State<AppState>, RequireAuth(user): RequireAuth) -> Response {
    match CheckoutService::new(state.pool()).place_order(user.id).await {
        Ok(receipt) => {
            Redirect::to(&format!("/orders?placed={}", receipt.order_id)).into_response()
        }
        Err(CheckoutError::EmptyCart) => Redirect::to("/cart?error=empty-cart").into_response(),
        Err(e) => {
            tracing::error!(step = e.step(), "Checkout failed: {e}");
            sentry::capture_error(&e);
            Redirect::to(&format!("/cart?error={}", e.step())).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_mutation_renders_notice_in_items_fragment() {
        let html = CartItemsTemplate {
            cart: CartView::empty(),
            error: Some(CART_UPDATE_FAILED.to_string()),
        }
        .render()
        .unwrap();

        assert!(html.contains("notice-error"));
        assert!(html.contains("update your cart"));
    }

    #[test]
    fn test_clean_items_fragment_has_no_notice() {
        let html = CartItemsTemplate {
            cart: CartView::empty(),
            error: None,
        }
        .render()
        .unwrap();

        assert!(!html.contains("notice-error"));
    }

    #[test]
    fn test_failed_add_emits_out_of_band_notice() {
        let html = CartCountTemplate {
            count: 3,
            notice: Some(Notice::error(CART_ADD_FAILED)),
        }
        .render()
        .unwrap();

        assert!(html.contains("hx-swap-oob"));
        assert!(html.contains("cart-notice"));
        assert!(html.contains("notice-error"));
        assert!(html.contains("add that to your cart"));
    }

    #[test]
    fn test_successful_add_emits_success_notice() {
        let html = CartCountTemplate {
            count: 3,
            notice: Some(Notice::success(CART_ADDED)),
        }
        .render()
        .unwrap();

        assert!(html.contains("notice-success"));
        assert!(html.contains("Added to cart."));
    }

    #[test]
    fn test_badge_refresh_is_just_the_count() {
        let html = CartCountTemplate {
            count: 3,
            notice: None,
        }
        .render()
        .unwrap();

        assert_eq!(html.trim(), "3");
    }

    #[test]
    fn test_checkout_error_messages_cover_every_step() {
        for step in [
            "empty-cart",
            "create-order",
            "order-lines",
            "clear-cart",
            "complete-order",
            "load-cart",
        ] {
            assert!(!checkout_error_message(step).is_empty());
        }
    }
}
