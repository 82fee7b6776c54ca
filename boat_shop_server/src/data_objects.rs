use boat_order_engine::db_types::OrderStatusType;
use serde::{Deserialize, Serialize};

/// Body of `POST /orders/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderRequest {
    pub product_id: i64,
    pub pickup_point_id: i64,
}

/// Body of `PATCH /orders/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatusType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Ok,
    Ignored,
}

/// What the webhook tells the provider: `{"status": "ok"}` or `{"status": "ignored"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: WebhookStatus,
}

impl WebhookResponse {
    pub fn ok() -> Self {
        Self { status: WebhookStatus::Ok }
    }

    pub fn ignored() -> Self {
        Self { status: WebhookStatus::Ignored }
    }
}
