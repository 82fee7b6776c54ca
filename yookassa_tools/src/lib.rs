//! # YooKassa tools
//!
//! A thin client for the parts of the YooKassa v3 API that the boat shop uses:
//! * creating a redirect-confirmation payment for an order ([`YooKassaApi::create_payment`]),
//! * verifying and parsing the webhook notifications that YooKassa posts back ([`helpers`]).
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod helpers;

pub use api::YooKassaApi;
pub use config::YooKassaConfig;
pub use data_objects::{
    Amount,
    Confirmation,
    NewPayment,
    Payment,
    PaymentMetadata,
    PaymentStatus,
    WebhookEvent,
    PAYMENT_SUCCEEDED_EVENT,
};
pub use error::YooKassaApiError;
