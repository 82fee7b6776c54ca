use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use shop_common::Rubles;
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been created and is waiting for the customer to pay.
    Pending,
    /// The payment provider has confirmed the payment.
    Paid,
    /// The order was cancelled by an admin, by the expiry sweeper, or because no payment could be created for it.
    Cancelled,
    /// The shop is preparing the item.
    Processing,
    /// The item is waiting at the pickup point.
    Ready,
    /// The customer has collected the item.
    Completed,
}

impl OrderStatusType {
    pub const ALL: [OrderStatusType; 6] =
        [Self::Pending, Self::Paid, Self::Cancelled, Self::Processing, Self::Ready, Self::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Completed => "completed",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            "processing" => Ok(Self::Processing),
            "ready" => Ok(Self::Ready),
            "completed" => Ok(Self::Completed),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     ProductType       ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Boat,
    OutboardMotor,
    Trailer,
}

impl Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductType::Boat => write!(f, "boat"),
            ProductType::OutboardMotor => write!(f, "outboard_motor"),
            ProductType::Trailer => write!(f, "trailer"),
        }
    }
}

impl FromStr for ProductType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boat" => Ok(Self::Boat),
            "outboard_motor" => Ok(Self::OutboardMotor),
            "trailer" => Ok(Self::Trailer),
            s => Err(ConversionError(format!("Invalid product type: {s}"))),
        }
    }
}

//--------------------------------------        Product        ---------------------------------------------------------
/// The part of a catalog product that the order core reads. Subtype details live with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Rubles,
    pub is_active: bool,
    pub type_product: ProductType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Catalog imports may carry their own ids. Leave empty to let the database assign one.
    pub id: Option<i64>,
    pub name: String,
    pub price: Rubles,
    pub is_active: bool,
    pub type_product: ProductType,
}

impl NewProduct {
    pub fn new<S: Into<String>>(name: S, price: Rubles, type_product: ProductType) -> Self {
        Self { id: None, name: name.into(), price, is_active: true, type_product }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

//--------------------------------------      PickupPoint      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PickupPoint {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub work_hours: String,
}

#[derive(Debug, Clone)]
pub struct NewPickupPoint {
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub work_hours: String,
}

impl NewPickupPoint {
    pub fn new<S: Into<String>>(name: S, address: S, work_hours: S) -> Self {
        Self { id: None, name: name.into(), address: address.into(), work_hours: work_hours.into() }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

//--------------------------------------        Order          ---------------------------------------------------------
/// A customer's order. Product and pickup point fields are copies taken when the order was placed, and never follow
/// later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub type_product: ProductType,
    pub total_price: Rubles,
    pub pickup_point_id: i64,
    pub pickup_point_name: String,
    pub pickup_point_address: String,
    pub work_hours: String,
    pub status: OrderStatusType,
    pub payment_id: Option<String>,
    pub payment_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn has_payment(&self) -> bool {
        self.payment_id.is_some()
    }

    /// True if the payment window has closed. Orders without a payment window never expire.
    pub fn is_past_payment_window(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| now > t).unwrap_or(false)
    }
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// The values frozen into an order at creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub user_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub type_product: ProductType,
    pub total_price: Rubles,
    pub pickup_point_id: i64,
    pub pickup_point_name: String,
    pub pickup_point_address: String,
    pub work_hours: String,
}

impl NewOrder {
    pub fn snapshot(user_id: i64, product: &Product, pickup_point: &PickupPoint) -> Self {
        Self {
            user_id,
            product_id: product.id,
            product_name: product.name.clone(),
            type_product: product.type_product,
            total_price: product.price,
            pickup_point_id: pickup_point.id,
            pickup_point_name: pickup_point.name.clone(),
            pickup_point_address: pickup_point.address.clone(),
            work_hours: pickup_point.work_hours.clone(),
        }
    }
}
