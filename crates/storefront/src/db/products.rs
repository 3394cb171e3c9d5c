//! Product catalog repository.
//!
//! Products are immutable from the storefront's perspective: the only
//! operations are listing (newest first) and lookup by ID. Writes happen
//! out of band (seeding, back office).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sundry_core::{Price, ProductId};

use super::RepositoryError;

/// A catalog product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Price,
    pub image_url: String,
    /// Units available; never negative.
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, category, price, image_url, stock, created_at
            FROM shop.products
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, description, category, price, image_url, stock, created_at
            FROM shop.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }
}
