//! # Backend contracts
//!
//! The order engine is written against these traits rather than a concrete database or payment provider.
//!
//! * [`OrderManagement`] stores and queries orders. Status writes are conditional on the status the caller last saw,
//!   so that two racing writers cannot both succeed.
//! * [`CatalogManagement`] reads products and pickup points. Its write methods belong to the catalog, and the order
//!   flow never calls them.
//! * [`PaymentProvider`] creates payment intents with an external provider.
mod catalog_management;
mod order_management;
mod payment_provider;

pub use catalog_management::CatalogManagement;
pub use order_management::{OrderManagement, StorageError};
pub use payment_provider::{PaymentIntent, PaymentProvider, PaymentRequest, ProviderError};
