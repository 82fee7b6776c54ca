use log::debug;
use shop_common::Rubles;
use sqlx::SqliteConnection;

use crate::db_types::{NewPickupPoint, NewProduct, PickupPoint, Product};

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_pickup_point(id: i64, conn: &mut SqliteConnection) -> Result<Option<PickupPoint>, sqlx::Error> {
    let point = sqlx::query_as("SELECT * FROM pickup_points WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(point)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (id, name, price, is_active, type_product) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(product.id)
    .bind(product.name)
    .bind(product.price.value())
    .bind(product.is_active)
    .bind(product.type_product.to_string())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product #{} '{}' added to the catalog", product.id, product.name);
    Ok(product)
}

pub async fn update_product_price(
    id: i64,
    price: Rubles,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("UPDATE products SET price = $1 WHERE id = $2 RETURNING *")
        .bind(price.value())
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn set_product_active(
    id: i64,
    is_active: bool,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("UPDATE products SET is_active = $1 WHERE id = $2 RETURNING *")
        .bind(is_active)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn insert_pickup_point(
    point: NewPickupPoint,
    conn: &mut SqliteConnection,
) -> Result<PickupPoint, sqlx::Error> {
    let point: PickupPoint = sqlx::query_as(
        "INSERT INTO pickup_points (id, name, address, work_hours) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(point.id)
    .bind(point.name)
    .bind(point.address)
    .bind(point.work_hours)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Pickup point #{} '{}' added", point.id, point.name);
    Ok(point)
}

pub async fn rename_pickup_point(
    id: i64,
    name: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PickupPoint>, sqlx::Error> {
    let point = sqlx::query_as("UPDATE pickup_points SET name = $1 WHERE id = $2 RETURNING *")
        .bind(name)
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(point)
}

pub async fn delete_pickup_point(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pickup_points WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
