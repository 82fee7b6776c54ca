use shop_common::Rubles;
use thiserror::Error;

use crate::db_types::OrderStatusType;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network failure, timeout or a server-side error. Trying again later may work.
    #[error("Payment provider is unavailable: {0}")]
    Unavailable(String),
    /// The provider understood the request and refused it.
    #[error("Payment provider rejected the request: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub order_id: i64,
    pub amount: Rubles,
    pub description: String,
    /// Providers return the original payment when they see a key for the second time.
    pub idempotence_key: String,
}

impl PaymentRequest {
    pub fn for_order(order_id: i64, amount: Rubles) -> Self {
        Self {
            order_id,
            amount,
            description: format!("Order #{order_id}"),
            idempotence_key: format!("order-{order_id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub payment_id: String,
    pub confirmation_url: String,
    /// The provider's view of the payment, expressed as an order status.
    pub provider_status: OrderStatusType,
}

#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Creates a payment intent for the order. The customer completes the payment at `confirmation_url`.
    async fn create_payment(&self, request: PaymentRequest) -> Result<PaymentIntent, ProviderError>;
}
