use std::sync::Arc;

use boat_order_engine::{
    db_types::Order,
    helpers::FixedClock,
    OrderFlowApi,
    OrderFlowError,
    PaymentConfirmation,
    SqliteDatabase,
};
use chrono::Utc;
use cucumber::World;
use log::*;

use crate::support::{new_database, provider::TestPaymentProvider};

#[derive(Default, Debug, World)]
pub struct OrderWorld {
    pub system: Option<OrderSystem>,
    pub last_order: Option<Order>,
    pub last_error: Option<OrderFlowError>,
    pub last_confirmation: Option<PaymentConfirmation>,
}

#[derive(Debug)]
pub struct OrderSystem {
    pub db_path: String,
    pub api: OrderFlowApi<SqliteDatabase, TestPaymentProvider>,
    pub provider: TestPaymentProvider,
    pub clock: FixedClock,
}

impl OrderWorld {
    pub fn system(&self) -> &OrderSystem {
        self.system.as_ref().expect("Order system not initialised")
    }

    pub fn api(&self) -> &OrderFlowApi<SqliteDatabase, TestPaymentProvider> {
        &self.system().api
    }

    pub fn last_order_id(&self) -> i64 {
        self.last_order.as_ref().expect("No order has been placed").id
    }
}

impl OrderSystem {
    pub async fn new() -> Self {
        let db = new_database().await;
        let db_path = db.url().to_string();
        debug!("Created database: {db_path}");
        let provider = TestPaymentProvider::default();
        let clock = FixedClock::new(Utc::now());
        let api = OrderFlowApi::new(db, provider.clone()).with_clock(Arc::new(clock.clone()));
        Self { db_path, api, provider, clock }
    }
}
