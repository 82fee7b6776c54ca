//! Boat Order Engine
//!
//! The order lifecycle core of the boat shop. It places orders for catalog items, obtains payment links from a
//! payment provider, and moves orders through their statuses in response to admins, payment notifications and
//! background sweeps. It is provider-agnostic and knows nothing about HTTP.
//!
//! The library is divided into these sections:
//! 1. Storage ([`traits`], [`mod@sqlite`]). Backends implement [`OrderManagement`] and [`CatalogManagement`]. SQLite is
//!    the supported backend. The data types that cross the API are in [`db_types`].
//! 2. The status rules ([`state_machine`]). Every status write in the engine goes through these checks.
//! 3. The public API ([`OrderFlowApi`]), which composes storage, the state machine, the [`PaymentProvider`], the
//!    listing [`cache`] and a [`helpers::Clock`].
//!
//! The engine also emits [`events`] when orders are created, paid, cancelled or otherwise change status. Subscribers
//! register async hooks and never hold up the request that triggered the event.
pub mod cache;
pub mod db_types;
pub mod events;
pub mod helpers;
mod shop_api;
pub mod state_machine;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use shop_api::{
    errors::OrderFlowError,
    order_flow_api::OrderFlowApi,
    order_objects::{self, OrderFlowConfig, PaymentConfirmation, ReconcileResult, TransitionOutcome},
};
pub use traits::{
    CatalogManagement,
    OrderManagement,
    PaymentIntent,
    PaymentProvider,
    PaymentRequest,
    ProviderError,
    StorageError,
};
