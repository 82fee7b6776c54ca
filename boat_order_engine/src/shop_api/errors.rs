use thiserror::Error;

use crate::{
    state_machine::TransitionError,
    traits::{ProviderError, StorageError},
};

/// Everything that can go wrong in an order use case. Each variant has a stable machine-readable [`tag`](Self::tag);
/// mapping to transport status codes is left to the caller.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("Product #{0} is not available for ordering")]
    Unavailable(i64),
    #[error("{0}")]
    InvalidTransition(#[from] TransitionError),
    #[error("Payment provider is unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Payment provider rejected the payment: {0}")]
    ProviderRejected(String),
    #[error("A payment could not be created for the order, so it has been cancelled. {0}")]
    PaymentUnavailable(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Storage error: {0}")]
    StorageError(StorageError),
}

impl OrderFlowError {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Unavailable(_) => "unavailable",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::ProviderRejected(_) => "provider_rejected",
            Self::PaymentUnavailable(_) => "payment_unavailable",
            Self::BadRequest(_) => "bad_request",
            Self::StorageError(_) => "storage_error",
        }
    }
}

impl From<StorageError> for OrderFlowError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::OrderNotFound(id) => Self::NotFound(format!("Order #{id}")),
            StorageError::ProductNotFound(id) => Self::NotFound(format!("Product #{id}")),
            StorageError::PickupPointNotFound(id) => Self::NotFound(format!("Pickup point #{id}")),
            e => Self::StorageError(e),
        }
    }
}

impl From<ProviderError> for OrderFlowError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Unavailable(s) => Self::ProviderUnavailable(s),
            ProviderError::Rejected(s) => Self::ProviderRejected(s),
        }
    }
}
