//! Adapter between the order engine and the YooKassa client.
use boat_order_engine::{db_types::OrderStatusType, PaymentIntent, PaymentProvider, PaymentRequest, ProviderError};
use log::*;
use yookassa_tools::{NewPayment, PaymentStatus, YooKassaApi, YooKassaApiError, YooKassaConfig};

/// Maps a YooKassa payment status onto the order status it implies.
pub fn map_provider_status(status: PaymentStatus) -> OrderStatusType {
    match status {
        PaymentStatus::Pending | PaymentStatus::WaitingForCapture => OrderStatusType::Pending,
        PaymentStatus::Succeeded => OrderStatusType::Paid,
        PaymentStatus::Canceled => OrderStatusType::Cancelled,
        PaymentStatus::Unknown => {
            warn!("💳️ Unknown YooKassa payment status. Treating the payment as pending.");
            OrderStatusType::Pending
        },
    }
}

/// Permanent API errors mean the payment was refused; anything else may succeed on another attempt.
pub fn to_provider_error(e: YooKassaApiError) -> ProviderError {
    if e.is_permanent() {
        ProviderError::Rejected(e.to_string())
    } else {
        ProviderError::Unavailable(e.to_string())
    }
}

#[derive(Clone)]
pub struct YooKassaProvider {
    api: YooKassaApi,
}

impl YooKassaProvider {
    pub fn new(config: YooKassaConfig) -> Result<Self, YooKassaApiError> {
        let api = YooKassaApi::new(config)?;
        Ok(Self { api })
    }

    pub fn api(&self) -> &YooKassaApi {
        &self.api
    }
}

impl PaymentProvider for YooKassaProvider {
    async fn create_payment(&self, request: PaymentRequest) -> Result<PaymentIntent, ProviderError> {
        let return_url = self.api.config().return_url.as_str();
        let payment = NewPayment::for_order(request.order_id, request.amount, &request.description, return_url);
        let payment = self.api.create_payment(&payment, &request.idempotence_key).await.map_err(|e| {
            warn!("💳️ YooKassa could not create a payment for order #{}. {e}", request.order_id);
            to_provider_error(e)
        })?;
        let confirmation_url = payment.confirmation_url().map(String::from).ok_or_else(|| {
            error!("💳️ Payment {} for order #{} came back without a confirmation URL", payment.id, request.order_id);
            ProviderError::Unavailable(format!("Payment {} has no confirmation URL", payment.id))
        })?;
        let provider_status = map_provider_status(payment.status);
        debug!("💳️ Payment {} issued for order #{}: {confirmation_url}", payment.id, request.order_id);
        Ok(PaymentIntent { payment_id: payment.id, confirmation_url, provider_status })
    }
}
