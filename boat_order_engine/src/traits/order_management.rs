use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderStatusType};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not run migrations: {0}")]
    MigrationError(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("Product #{0} does not exist")]
    ProductNotFound(i64),
    #[error("Pickup point #{0} does not exist")]
    PickupPointNotFound(i64),
    #[error("Order #{0} already has a payment attached")]
    PaymentAlreadyAttached(i64),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    /// Stores a new order with status `pending`. `created_at` is taken from the database clock.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError>;

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, StorageError>;

    /// All orders belonging to `user_id`, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorageError>;

    /// Every order in the shop, newest first.
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, StorageError>;

    /// Sets the payment fields of an order. This succeeds at most once per order: if a payment id is already present,
    /// [`StorageError::PaymentAlreadyAttached`] is returned and nothing is written.
    async fn attach_payment(
        &self,
        id: i64,
        payment_id: &str,
        payment_url: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Order, StorageError>;

    /// Moves the order from `from` to `to`, but only if its status is still `from`.
    ///
    /// Returns `None` when the order exists but its status has changed since the caller read it. Legality of the
    /// transition is the caller's concern.
    async fn update_order_status(
        &self,
        id: i64,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<Option<Order>, StorageError>;

    /// Orders in `pending` status, oldest first. Used by the background sweeps.
    async fn fetch_pending_orders(&self) -> Result<Vec<Order>, StorageError>;
}
