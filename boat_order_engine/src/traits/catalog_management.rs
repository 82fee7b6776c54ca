use shop_common::Rubles;

use crate::{
    db_types::{NewPickupPoint, NewProduct, PickupPoint, Product},
    traits::StorageError,
};

#[allow(async_fn_in_trait)]
pub trait CatalogManagement: Clone {
    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, StorageError>;

    async fn fetch_pickup_point(&self, id: i64) -> Result<Option<PickupPoint>, StorageError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, StorageError>;

    async fn update_product_price(&self, id: i64, price: Rubles) -> Result<Product, StorageError>;

    async fn set_product_active(&self, id: i64, is_active: bool) -> Result<Product, StorageError>;

    async fn insert_pickup_point(&self, point: NewPickupPoint) -> Result<PickupPoint, StorageError>;

    async fn rename_pickup_point(&self, id: i64, name: &str) -> Result<PickupPoint, StorageError>;

    /// Returns false if there was nothing to delete.
    async fn delete_pickup_point(&self, id: i64) -> Result<bool, StorageError>;
}
