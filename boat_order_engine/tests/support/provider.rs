use std::sync::{Arc, Mutex};

use boat_order_engine::{
    db_types::OrderStatusType,
    PaymentIntent,
    PaymentProvider,
    PaymentRequest,
    ProviderError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderMode {
    Accept,
    Unavailable,
    Reject,
}

/// A payment provider that answers instantly and remembers what it was asked.
#[derive(Debug, Clone)]
pub struct TestPaymentProvider {
    mode: Arc<Mutex<ProviderMode>>,
    requests: Arc<Mutex<Vec<PaymentRequest>>>,
}

impl Default for TestPaymentProvider {
    fn default() -> Self {
        Self { mode: Arc::new(Mutex::new(ProviderMode::Accept)), requests: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl TestPaymentProvider {
    pub fn set_mode(&self, mode: ProviderMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn requests(&self) -> Vec<PaymentRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn payment_id_for(order_id: i64) -> String {
        format!("pay-{order_id}")
    }
}

impl PaymentProvider for TestPaymentProvider {
    async fn create_payment(&self, request: PaymentRequest) -> Result<PaymentIntent, ProviderError> {
        let order_id = request.order_id;
        self.requests.lock().unwrap().push(request);
        let mode = *self.mode.lock().unwrap();
        match mode {
            ProviderMode::Accept => Ok(PaymentIntent {
                payment_id: Self::payment_id_for(order_id),
                confirmation_url: format!("https://yoomoney.example/checkout/{}", Self::payment_id_for(order_id)),
                provider_status: OrderStatusType::Pending,
            }),
            ProviderMode::Unavailable => Err(ProviderError::Unavailable("connection timed out".into())),
            ProviderMode::Reject => Err(ProviderError::Rejected("invalid_request".into())),
        }
    }
}
