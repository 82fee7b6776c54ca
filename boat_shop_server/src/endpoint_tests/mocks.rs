use boat_order_engine::{db_types::OrderStatusType, PaymentIntent, PaymentProvider, PaymentRequest, ProviderError};
use mockall::mock;

mock! {
    pub Provider {}
    impl PaymentProvider for Provider {
        async fn create_payment(&self, request: PaymentRequest) -> Result<PaymentIntent, ProviderError>;
    }
}

/// A provider that issues `pay-{order_id}` for every order.
pub fn accepting_provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.expect_create_payment().returning(|req| Ok(intent_for(req.order_id)));
    provider
}

pub fn intent_for(order_id: i64) -> PaymentIntent {
    PaymentIntent {
        payment_id: format!("pay-{order_id}"),
        confirmation_url: format!("https://yoomoney.example/checkout/pay-{order_id}"),
        provider_status: OrderStatusType::Pending,
    }
}
