//! Checkout service.
//!
//! Converts a user's cart into an order through a fixed, forward-only
//! sequence of steps:
//!
//! 1. load the cart and reject if empty
//! 2. create the order row with status `pending`
//! 3. insert a line snapshot per cart line (product, quantity, unit price)
//! 4. clear the cart
//! 5. flip the order to `completed`
//!
//! There is no compensation: a failure stops the sequence where it
//! happened and reports exactly which step failed. A pending order with
//! no lines, or a completed order alongside a stale cart, are the two
//! observable partial states and both are recoverable by inspection.
//!
//! The service runs over the [`CartStore`] and [`OrderStore`] traits so
//! the step ordering can be exercised without a live database.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use sundry_core::{OrderId, OrderStatus, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::db::orders::{NewOrderLine, OrderRepository};
use crate::models::cart::{Cart, CartLine};

/// Errors from the checkout sequence, one variant per step.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart could not be read.
    #[error("failed to load cart: {0}")]
    LoadCart(#[source] RepositoryError),

    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// The order row could not be created; nothing was written.
    #[error("failed to create order: {0}")]
    CreateOrder(#[source] RepositoryError),

    /// Line snapshots could not be written; a pending order exists.
    #[error("failed to write lines for order {order_id}: {source}")]
    CreateOrderLines {
        order_id: OrderId,
        source: RepositoryError,
    },

    /// The cart could not be cleared; the order exists with its lines.
    #[error("failed to clear cart after order {order_id}: {source}")]
    ClearCart {
        order_id: OrderId,
        source: RepositoryError,
    },

    /// The order could not be flipped to completed.
    #[error("failed to complete order {order_id}: {source}")]
    CompleteOrder {
        order_id: OrderId,
        source: RepositoryError,
    },
}

impl CheckoutError {
    /// Short identifier for the failed step, used in redirects and logs.
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::LoadCart(_) => "load-cart",
            Self::EmptyCart => "empty-cart",
            Self::CreateOrder(_) => "create-order",
            Self::CreateOrderLines { .. } => "order-lines",
            Self::ClearCart { .. } => "clear-cart",
            Self::CompleteOrder { .. } => "complete-order",
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutReceipt {
    /// The completed order.
    pub order_id: OrderId,
}

/// Snapshot cart lines into order line inputs.
///
/// Quantity and unit price are copied as-is; later catalog price changes
/// never touch placed orders.
#[must_use]
pub fn order_lines_from_cart(lines: &[CartLine]) -> Vec<NewOrderLine> {
    lines
        .iter()
        .map(|line| NewOrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
            price: line.price,
        })
        .collect()
}

/// Cart operations the checkout sequence depends on.
#[allow(async_fn_in_trait)]
pub trait CartStore {
    /// Fetch the user's cart lines.
    async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError>;

    /// Delete every cart line for the user.
    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError>;
}

/// Order operations the checkout sequence depends on.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Insert a new order row and return its ID.
    async fn create(
        &self,
        user_id: UserId,
        total: Decimal,
        status: OrderStatus,
    ) -> Result<OrderId, RepositoryError>;

    /// Insert the line snapshots for an order.
    async fn insert_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), RepositoryError>;

    /// Flip an order from `pending` to `completed`.
    async fn mark_completed(&self, order_id: OrderId) -> Result<(), RepositoryError>;
}

impl CartStore for CartRepository<'_> {
    async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        CartRepository::lines_for_user(self, user_id).await
    }

    async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        CartRepository::clear(self, user_id).await
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn create(
        &self,
        user_id: UserId,
        total: Decimal,
        status: OrderStatus,
    ) -> Result<OrderId, RepositoryError> {
        OrderRepository::create(self, user_id, total, status).await
    }

    async fn insert_lines(
        &self,
        order_id: OrderId,
        lines: &[NewOrderLine],
    ) -> Result<(), RepositoryError> {
        OrderRepository::insert_lines(self, order_id, lines).await
    }

    async fn mark_completed(&self, order_id: OrderId) -> Result<(), RepositoryError> {
        OrderRepository::mark_completed(self, order_id).await
    }
}

/// Checkout service.
pub struct CheckoutService<C, O> {
    cart: C,
    orders: O,
}

impl<'a> CheckoutService<CartRepository<'a>, OrderRepository<'a>> {
    /// Create a checkout service over the database repositories.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            cart: CartRepository::new(pool),
            orders: OrderRepository::new(pool),
        }
    }
}

impl<C: CartStore, O: OrderStore> CheckoutService<C, O> {
    /// Assemble a checkout service from explicit stores.
    pub const fn from_parts(cart: C, orders: O) -> Self {
        Self { cart, orders }
    }

    /// Place an order from the user's current cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] naming the exact step that failed.
    pub async fn place_order(&self, user_id: UserId) -> Result<CheckoutReceipt, CheckoutError> {
        let lines = self
            .cart
            .lines_for_user(user_id)
            .await
            .map_err(CheckoutError::LoadCart)?;

        let cart = Cart::new(lines);
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total = cart.subtotal();

        let order_id = self
            .orders
            .create(user_id, total, OrderStatus::Pending)
            .await
            .map_err(CheckoutError::CreateOrder)?;

        let order_lines = order_lines_from_cart(&cart.lines);
        self.orders
            .insert_lines(order_id, &order_lines)
            .await
            .map_err(|source| CheckoutError::CreateOrderLines { order_id, source })?;

        self.cart
            .clear(user_id)
            .await
            .map_err(|source| CheckoutError::ClearCart { order_id, source })?;

        self.orders
            .mark_completed(order_id)
            .await
            .map_err(|source| CheckoutError::CompleteOrder { order_id, source })?;

        tracing::info!(
            user_id = %user_id,
            order_id = %order_id,
            total = %total,
            "order placed"
        );

        Ok(CheckoutReceipt { order_id })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rust_decimal::Decimal;
    use sundry_core::{CartLineId, Price, ProductId};

    use super::*;

    fn line(id: i32, price_cents: i64, quantity: i32) -> CartLine {
        CartLine {
            id: CartLineId::new(id),
            product_id: ProductId::new(id),
            name: format!("product-{id}"),
            image_url: String::new(),
            price: Price::new(Decimal::new(price_cents, 2)),
            quantity,
            stock: 100,
        }
    }

    #[test]
    fn test_snapshot_copies_price_and_quantity() {
        let lines = vec![line(1, 1000, 2), line(2, 550, 1)];
        let snapshot = order_lines_from_cart(&lines);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].product_id, ProductId::new(1));
        assert_eq!(snapshot[0].quantity, 2);
        assert_eq!(snapshot[0].price, Price::new(Decimal::new(1000, 2)));
        assert_eq!(snapshot[1].quantity, 1);
        assert_eq!(snapshot[1].price, Price::new(Decimal::new(550, 2)));
    }

    #[test]
    fn test_snapshot_of_empty_cart_is_empty() {
        assert!(order_lines_from_cart(&[]).is_empty());
    }

    #[test]
    fn test_step_names() {
        let db = || RepositoryError::NotFound;
        let order_id = OrderId::new(7);

        assert_eq!(CheckoutError::LoadCart(db()).step(), "load-cart");
        assert_eq!(CheckoutError::EmptyCart.step(), "empty-cart");
        assert_eq!(CheckoutError::CreateOrder(db()).step(), "create-order");
        assert_eq!(
            CheckoutError::CreateOrderLines {
                order_id,
                source: db()
            }
            .step(),
            "order-lines"
        );
        assert_eq!(
            CheckoutError::ClearCart {
                order_id,
                source: db()
            }
            .step(),
            "clear-cart"
        );
        assert_eq!(
            CheckoutError::CompleteOrder {
                order_id,
                source: db()
            }
            .step(),
            "complete-order"
        );
    }

    #[test]
    fn test_step_failure_messages_name_the_order() {
        let err = CheckoutError::ClearCart {
            order_id: OrderId::new(42),
            source: RepositoryError::NotFound,
        };
        assert!(err.to_string().contains("42"));
    }

    // =========================================================================
    // Step ordering and partial failure
    //
    // In-memory stores record every step they see, so these tests can
    // assert which steps ran, in what order, and which never did.
    // =========================================================================

    #[derive(Default)]
    struct Journal(Mutex<Vec<&'static str>>);

    impl Journal {
        fn record(&self, step: &'static str) {
            self.0.lock().unwrap().push(step);
        }

        fn steps(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    fn db_failure() -> RepositoryError {
        RepositoryError::Database(sqlx::Error::PoolClosed)
    }

    struct FakeCart {
        journal: Arc<Journal>,
        lines: Vec<CartLine>,
        fail_load: bool,
        fail_clear: bool,
        cleared: Mutex<bool>,
    }

    impl CartStore for &FakeCart {
        async fn lines_for_user(
            &self,
            _user_id: UserId,
        ) -> Result<Vec<CartLine>, RepositoryError> {
            self.journal.record("load-cart");
            if self.fail_load {
                return Err(db_failure());
            }
            Ok(self.lines.clone())
        }

        async fn clear(&self, _user_id: UserId) -> Result<(), RepositoryError> {
            self.journal.record("clear-cart");
            if self.fail_clear {
                return Err(db_failure());
            }
            *self.cleared.lock().unwrap() = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeOrders {
        journal: Arc<Journal>,
        fail_create: bool,
        fail_lines: bool,
        fail_complete: bool,
        created: Mutex<Option<(UserId, Decimal, OrderStatus)>>,
        lines: Mutex<Vec<NewOrderLine>>,
        completed: Mutex<bool>,
    }

    impl OrderStore for &FakeOrders {
        async fn create(
            &self,
            user_id: UserId,
            total: Decimal,
            status: OrderStatus,
        ) -> Result<OrderId, RepositoryError> {
            self.journal.record("create-order");
            if self.fail_create {
                return Err(db_failure());
            }
            *self.created.lock().unwrap() = Some((user_id, total, status));
            Ok(OrderId::new(77))
        }

        async fn insert_lines(
            &self,
            _order_id: OrderId,
            lines: &[NewOrderLine],
        ) -> Result<(), RepositoryError> {
            self.journal.record("order-lines");
            if self.fail_lines {
                return Err(db_failure());
            }
            self.lines.lock().unwrap().extend_from_slice(lines);
            Ok(())
        }

        async fn mark_completed(&self, _order_id: OrderId) -> Result<(), RepositoryError> {
            self.journal.record("complete-order");
            if self.fail_complete {
                return Err(db_failure());
            }
            *self.completed.lock().unwrap() = true;
            Ok(())
        }
    }

    fn fakes(lines: Vec<CartLine>) -> (Arc<Journal>, FakeCart, FakeOrders) {
        let journal = Arc::new(Journal::default());
        let cart = FakeCart {
            journal: Arc::clone(&journal),
            lines,
            fail_load: false,
            fail_clear: false,
            cleared: Mutex::new(false),
        };
        let orders = FakeOrders {
            journal: Arc::clone(&journal),
            ..FakeOrders::default()
        };
        (journal, cart, orders)
    }

    fn two_line_cart() -> Vec<CartLine> {
        vec![line(1, 1000, 2), line(2, 550, 1)]
    }

    #[tokio::test]
    async fn test_successful_checkout_runs_every_step_in_order() {
        let (journal, cart, orders) = fakes(two_line_cart());
        let service = CheckoutService::from_parts(&cart, &orders);

        let receipt = service.place_order(UserId::new(1)).await.unwrap();

        assert_eq!(receipt.order_id, OrderId::new(77));
        assert_eq!(
            journal.steps(),
            [
                "load-cart",
                "create-order",
                "order-lines",
                "clear-cart",
                "complete-order"
            ]
        );

        let created = orders.created.lock().unwrap().unwrap();
        assert_eq!(created.1, Decimal::new(2550, 2));
        assert_eq!(created.2, OrderStatus::Pending);
        assert_eq!(orders.lines.lock().unwrap().len(), 2);
        assert!(*orders.completed.lock().unwrap());
        assert!(*cart.cleared.lock().unwrap());
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_before_any_write() {
        let (journal, cart, orders) = fakes(Vec::new());
        let service = CheckoutService::from_parts(&cart, &orders);

        let err = service.place_order(UserId::new(1)).await.unwrap_err();

        assert_eq!(err.step(), "empty-cart");
        assert_eq!(journal.steps(), ["load-cart"]);
        assert!(orders.created.lock().unwrap().is_none());
        assert!(!*cart.cleared.lock().unwrap());
    }

    #[tokio::test]
    async fn test_load_failure_stops_the_sequence() {
        let (journal, mut cart, orders) = fakes(two_line_cart());
        cart.fail_load = true;
        let service = CheckoutService::from_parts(&cart, &orders);

        let err = service.place_order(UserId::new(1)).await.unwrap_err();

        assert_eq!(err.step(), "load-cart");
        assert_eq!(journal.steps(), ["load-cart"]);
        assert!(orders.created.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_order_failure_writes_nothing_else() {
        let (journal, cart, mut orders) = fakes(two_line_cart());
        orders.fail_create = true;
        let service = CheckoutService::from_parts(&cart, &orders);

        let err = service.place_order(UserId::new(1)).await.unwrap_err();

        assert_eq!(err.step(), "create-order");
        assert_eq!(journal.steps(), ["load-cart", "create-order"]);
        assert!(orders.lines.lock().unwrap().is_empty());
        assert!(!*orders.completed.lock().unwrap());
        assert!(!*cart.cleared.lock().unwrap());
    }

    #[tokio::test]
    async fn test_order_lines_failure_leaves_pending_order_and_full_cart() {
        let (journal, cart, mut orders) = fakes(two_line_cart());
        orders.fail_lines = true;
        let service = CheckoutService::from_parts(&cart, &orders);

        let err = service.place_order(UserId::new(1)).await.unwrap_err();

        assert_eq!(
            journal.steps(),
            ["load-cart", "create-order", "order-lines"]
        );
        let created = orders.created.lock().unwrap().unwrap();
        assert_eq!(created.2, OrderStatus::Pending);
        assert!(!*orders.completed.lock().unwrap());
        assert!(!*cart.cleared.lock().unwrap());

        match err {
            CheckoutError::CreateOrderLines { order_id, .. } => {
                assert_eq!(order_id, OrderId::new(77));
            }
            other => panic!("expected CreateOrderLines, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clear_cart_failure_keeps_order_and_lines_intact() {
        let (journal, mut cart, orders) = fakes(two_line_cart());
        cart.fail_clear = true;
        let service = CheckoutService::from_parts(&cart, &orders);

        let err = service.place_order(UserId::new(1)).await.unwrap_err();

        assert_eq!(err.step(), "clear-cart");
        assert_eq!(
            journal.steps(),
            ["load-cart", "create-order", "order-lines", "clear-cart"]
        );
        // The order and its lines stand; the flip to completed never ran.
        assert!(orders.created.lock().unwrap().is_some());
        assert_eq!(orders.lines.lock().unwrap().len(), 2);
        assert!(!*orders.completed.lock().unwrap());
        assert!(!*cart.cleared.lock().unwrap());
    }

    #[tokio::test]
    async fn test_complete_failure_leaves_order_pending_with_cart_cleared() {
        let (journal, cart, mut orders) = fakes(two_line_cart());
        orders.fail_complete = true;
        let service = CheckoutService::from_parts(&cart, &orders);

        let err = service.place_order(UserId::new(1)).await.unwrap_err();

        assert_eq!(err.step(), "complete-order");
        assert_eq!(
            journal.steps(),
            [
                "load-cart",
                "create-order",
                "order-lines",
                "clear-cart",
                "complete-order"
            ]
        );
        assert!(*cart.cleared.lock().unwrap());
        assert!(!*orders.completed.lock().unwrap());
    }
}
