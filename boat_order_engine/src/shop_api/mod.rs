//! # Order engine public API
//!
//! [`order_flow_api::OrderFlowApi`] implements the order use cases: placing an order and issuing its payment link,
//! reading orders, changing their status, and the background expiry and reconciliation sweeps.
//!
//! An API instance is built from a backend that implements the storage traits and a payment provider:
//!
//! ```rust,ignore
//! use boat_order_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/boat_shop.db", 25).await?;
//! let api = OrderFlowApi::new(db, provider);
//! let order = api.create_order(user_id, product_id, pickup_point_id).await?;
//! ```
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
