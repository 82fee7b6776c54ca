//! `SqliteDatabase` is the SQLite implementation of the order engine backend traits.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use shop_common::Rubles;
use sqlx::SqlitePool;

use super::db::{catalog, db_url, new_pool, orders};
use crate::{
    db_types::{NewOrder, NewPickupPoint, NewProduct, Order, OrderStatusType, PickupPoint, Product},
    traits::{CatalogManagement, OrderManagement, StorageError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order_by_id(&self, id: i64) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_all_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn attach_payment(
        &self,
        id: i64,
        payment_id: &str,
        payment_url: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Order, StorageError> {
        let mut tx = self.pool.begin().await?;
        let updated = orders::set_payment_details(id, payment_id, payment_url, expires_at, &mut tx).await?;
        let order = match updated {
            Some(order) => order,
            None => {
                // Dropping the transaction rolls it back
                let exists = orders::fetch_order_by_id(id, &mut tx).await?.is_some();
                return if exists {
                    warn!("🗃️ Order #{id} already has a payment. Refusing to attach {payment_id}");
                    Err(StorageError::PaymentAlreadyAttached(id))
                } else {
                    Err(StorageError::OrderNotFound(id))
                };
            },
        };
        tx.commit().await?;
        debug!("🗃️ Payment {payment_id} attached to order #{id}");
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: i64,
        from: OrderStatusType,
        to: OrderStatusType,
    ) -> Result<Option<Order>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let updated = orders::update_order_status(id, from, to, &mut tx).await?;
        if updated.is_none() && orders::fetch_order_by_id(id, &mut tx).await?.is_none() {
            return Err(StorageError::OrderNotFound(id));
        }
        tx.commit().await?;
        Ok(updated)
    }

    async fn fetch_pending_orders(&self) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_with_status(OrderStatusType::Pending, &mut conn).await?;
        Ok(orders)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let product = catalog::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_pickup_point(&self, id: i64) -> Result<Option<PickupPoint>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        let point = catalog::fetch_pickup_point(id, &mut conn).await?;
        Ok(point)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StorageError> {
        let mut tx = self.pool.begin().await?;
        let product = catalog::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn update_product_price(&self, id: i64, price: Rubles) -> Result<Product, StorageError> {
        let mut tx = self.pool.begin().await?;
        let product = catalog::update_product_price(id, price, &mut tx).await?.ok_or(StorageError::ProductNotFound(id))?;
        tx.commit().await?;
        Ok(product)
    }

    async fn set_product_active(&self, id: i64, is_active: bool) -> Result<Product, StorageError> {
        let mut tx = self.pool.begin().await?;
        let product =
            catalog::set_product_active(id, is_active, &mut tx).await?.ok_or(StorageError::ProductNotFound(id))?;
        tx.commit().await?;
        Ok(product)
    }

    async fn insert_pickup_point(&self, point: NewPickupPoint) -> Result<PickupPoint, StorageError> {
        let mut tx = self.pool.begin().await?;
        let point = catalog::insert_pickup_point(point, &mut tx).await?;
        tx.commit().await?;
        Ok(point)
    }

    async fn rename_pickup_point(&self, id: i64, name: &str) -> Result<PickupPoint, StorageError> {
        let mut tx = self.pool.begin().await?;
        let point =
            catalog::rename_pickup_point(id, name, &mut tx).await?.ok_or(StorageError::PickupPointNotFound(id))?;
        tx.commit().await?;
        Ok(point)
    }

    async fn delete_pickup_point(&self, id: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let deleted = catalog::delete_pickup_point(id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `SHOP_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}
