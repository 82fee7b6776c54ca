use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType},
    traits::StorageError,
};

/// Inserts a new order using the given connection. This is not atomic on its own; embed it in a transaction if it
/// must succeed or fail with other writes.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, StorageError> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                user_id,
                product_id,
                product_name,
                type_product,
                total_price,
                pickup_point_id,
                pickup_point_name,
                pickup_point_address,
                work_hours,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
            RETURNING *;
        "#,
    )
    .bind(order.user_id)
    .bind(order.product_id)
    .bind(order.product_name)
    .bind(order.type_product.to_string())
    .bind(order.total_price.value())
    .bind(order.pickup_point_id)
    .bind(order.pickup_point_name)
    .bind(order.pickup_point_address)
    .bind(order.work_hours)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} inserted for user {}", order.id, order.user_id);
    Ok(order)
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_all_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, id DESC").fetch_all(conn).await?;
    Ok(orders)
}

pub async fn fetch_orders_with_status(
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE status = $1 ORDER BY created_at ASC, id ASC")
        .bind(status.to_string())
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Writes the payment fields, but only if the order does not have a payment yet.
///
/// Returns `None` if no row was updated, i.e. the order is missing or already has a payment.
pub(crate) async fn set_payment_details(
    id: i64,
    payment_id: &str,
    payment_url: &str,
    expires_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET payment_id = $1, payment_url = $2, expires_at = $3
        WHERE id = $4 AND payment_id IS NULL
        RETURNING *;
        "#,
    )
    .bind(payment_id)
    .bind(payment_url)
    .bind(expires_at)
    .bind(id)
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Payment details for order #{id} written: {}", order.is_some());
    Ok(order)
}

/// Conditional status write. The row is only touched if it still has status `from`.
pub(crate) async fn update_order_status(
    id: i64,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3 RETURNING *")
        .bind(to.to_string())
        .bind(id)
        .bind(from.to_string())
        .fetch_optional(conn)
        .await?;
    trace!("🗃️ Status update for order #{id} ({from} -> {to}) applied: {}", order.is_some());
    Ok(order)
}
