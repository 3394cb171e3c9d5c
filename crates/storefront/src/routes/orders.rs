//! Order history route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use sundry_core::format_usd;

use crate::db::orders::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::order::{Order, OrderLine};
use crate::routes::Nav;
use crate::state::AppState;

/// Order line display data for templates.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub image_url: String,
    pub quantity: i32,
    pub price: String,
    pub line_total: String,
}

impl From<&OrderLine> for OrderLineView {
    fn from(line: &OrderLine) -> Self {
        Self {
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            quantity: line.quantity,
            price: line.price.display(),
            line_total: format_usd(line.line_total()),
        }
    }
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: i32,
    pub total: String,
    pub status: String,
    pub placed_at: String,
    pub lines: Vec<OrderLineView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            total: format_usd(order.total),
            status: order.status.to_string(),
            placed_at: order.created_at.format("%B %e, %Y").to_string(),
            lines: order.lines.iter().map(OrderLineView::from).collect(),
        }
    }
}

/// Query parameters for the order history page.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    /// ID of an order that was just placed, set by the checkout redirect.
    pub placed: Option<i32>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub nav: Nav,
    pub orders: Vec<OrderView>,
    pub placed: Option<i32>,
}

/// Display the order history, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderRepository::new(state.pool()).history(user.id).await?;

    let nav = super::nav(&state, Some(user)).await;

    Ok(OrdersIndexTemplate {
        nav,
        orders: orders.iter().map(OrderView::from).collect(),
        placed: query.placed,
    })
}
