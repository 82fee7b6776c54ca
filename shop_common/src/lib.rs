mod rubles;

pub mod helpers;
mod secret;

pub use rubles::{Rubles, RUBLE_CURRENCY_CODE};
pub use secret::Secret;
