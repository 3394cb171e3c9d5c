//! Order repository.
//!
//! Writes here are only ever issued by the checkout sequencer
//! (`services::checkout`), in a fixed step order. Each method maps to
//! exactly one checkout step so a failure can be attributed precisely.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use sundry_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderLine};

/// Input for one order line snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price at the moment of checkout.
    pub price: Price,
}

/// Order row without its lines (internal to history assembly).
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    total: Decimal,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

/// Repository for order writes and the history view.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new order row and return its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        user_id: UserId,
        total: Decimal,
        status: OrderStatus,
    ) -> Result<OrderId, RepositoryError> {
        let order_id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO shop.orders (user_id, total, status)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(total)
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        Ok(order_id)
    }

    /// Insert the line snapshots for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails. Lines
    /// already written stay written; the caller reports the step failure
    /// rather than compensating.
    pub async fn insert_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), RepositoryError> {
        for line in lines {
            sqlx::query(
                r"
                INSERT INTO shop.order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .execute(self.pool)
            .await?;
        }

        Ok(())
    }

    /// Flip an order from `pending` to `completed`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist or
    /// is no longer pending, `RepositoryError::Database` on query failure.
    pub async fn mark_completed(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.orders
            SET status = $1
            WHERE id = $2 AND status = $3
            ",
        )
        .bind(OrderStatus::Completed)
        .bind(order_id)
        .bind(OrderStatus::Pending)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Fetch a user's orders with their line snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, total, status, created_at
            FROM shop.orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = rows.iter().map(|row| row.id.as_i32()).collect();
        let lines = sqlx::query_as::<_, OrderLine>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, p.name, p.image_url, oi.price, oi.quantity
            FROM shop.order_items oi
            JOIN shop.products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut orders: Vec<Order> = rows
            .into_iter()
            .map(|row| Order {
                id: row.id,
                total: row.total,
                status: row.status,
                created_at: row.created_at,
                lines: Vec::new(),
            })
            .collect();

        for line in lines {
            if let Some(order) = orders.iter_mut().find(|order| order.id == line.order_id) {
                order.lines.push(line);
            }
        }

        Ok(orders)
    }
}
