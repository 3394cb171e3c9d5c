//! Cart repository.
//!
//! `shop.cart_items` holds at most one row per (user, product); the unique
//! constraint plus the atomic upsert in [`CartRepository::add`] gives
//! merge-or-insert semantics without a read-then-write race, even across
//! concurrent sessions on the same account.
//!
//! All line-level mutations are scoped to the owning user so one user can
//! never touch another user's cart rows.

use sqlx::PgPool;

use sundry_core::{CartLineId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{CartLine, accepts_quantity};

/// Repository for cart reads and mutations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch a user's cart lines joined with their products.
    ///
    /// An empty result is a normal state, not an error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            r"
            SELECT ci.id, ci.product_id, p.name, p.image_url, p.price, ci.quantity, p.stock
            FROM shop.cart_items ci
            JOIN shop.products p ON p.id = ci.product_id
            WHERE ci.user_id = $1
            ORDER BY ci.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }

    /// Total number of units in a user's cart (for the nav badge).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM shop.cart_items
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Add a quantity of a product to a user's cart.
    ///
    /// Merge-or-insert: if a line for (user, product) already exists its
    /// quantity is incremented by `quantity`; otherwise a new line is
    /// created. The upsert is a single atomic statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails (for
    /// example when the product does not exist).
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if !accepts_quantity(quantity) {
            return Ok(());
        }

        sqlx::query(
            r"
            INSERT INTO shop.cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set a cart line's quantity.
    ///
    /// A requested quantity below the floor is a silent no-op: nothing is
    /// persisted and the prior quantity stands. A line ID that does not
    /// belong to the user is also a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        if !accepts_quantity(quantity) {
            return Ok(());
        }

        sqlx::query(
            r"
            UPDATE shop.cart_items
            SET quantity = $1
            WHERE id = $2 AND user_id = $3
            ",
        )
        .bind(quantity)
        .bind(line_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a cart line unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove(&self, user_id: UserId, line_id: CartLineId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM shop.cart_items
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(line_id)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete every cart line for a user (the final step of checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM shop.cart_items
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
