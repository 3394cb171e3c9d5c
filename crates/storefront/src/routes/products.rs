//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use sundry_core::format_usd;

use crate::db::products::{Product, ProductRepository};
use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::routes::Nav;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
    pub image_url: String,
    pub stock: i32,
    pub in_stock: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            price: format_usd(product.price.amount()),
            image_url: product.image_url.clone(),
            stock: product.stock,
            in_stock: product.in_stock(),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub nav: Nav,
    pub products: Vec<ProductView>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub nav: Nav,
    pub product: ProductView,
}

/// Display the product listing (home page), newest first.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    let products = ProductRepository::new(state.pool()).list().await?;

    let nav = super::nav(&state, user).await;

    Ok(ProductsIndexTemplate {
        nav,
        products: products.iter().map(ProductView::from).collect(),
    })
}

/// Display a product detail page.
///
/// An unknown product ID redirects home instead of rendering an error page.
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let product = ProductRepository::new(state.pool())
        .get(sundry_core::ProductId::new(id))
        .await?;

    let Some(product) = product else {
        return Ok(Redirect::to("/").into_response());
    };

    let nav = super::nav(&state, user).await;

    Ok(ProductShowTemplate {
        nav,
        product: ProductView::from(&product),
    }
    .into_response())
}
