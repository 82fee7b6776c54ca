//! # Boat shop server
//! This crate hosts the HTTP side of the boat shop order lifecycle. It is responsible for:
//! * Accepting orders from logged-in customers and handing back a payment link.
//! * Listing and showing orders to their owners, and to admins.
//! * Letting admins move orders through their statuses.
//! * Receiving payment notifications from YooKassa and marking orders as paid.
//! * Running the background sweeps that expire unpaid orders and repair orders that never got a payment link.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /orders/`, `GET /orders/`: Place an order, list your orders.
//! * `GET /orders/{id}/`: Show one order.
//! * `GET /orders/all-orders`, `PATCH /orders/{id}/`: Admin only. List every order, change an order's status.
//! * `POST /webhooks/yookassa`: Payment notifications from YooKassa.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
