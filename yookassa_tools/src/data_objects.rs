use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shop_common::{Rubles, RUBLE_CURRENCY_CODE};

/// The only webhook event that moves an order forward.
pub const PAYMENT_SUCCEEDED_EVENT: &str = "payment.succeeded";

//--------------------------------------        Amount         ---------------------------------------------------------
/// YooKassa expresses money as a decimal string plus an ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: String,
    pub currency: String,
}

impl Amount {
    pub fn rubles(price: Rubles) -> Self {
        Self { value: format!("{}.00", price.value()), currency: RUBLE_CURRENCY_CODE.to_string() }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

//--------------------------------------     Confirmation      ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_url: Option<String>,
}

impl Confirmation {
    pub fn redirect<S: Into<String>>(return_url: S) -> Self {
        Self { kind: "redirect".to_string(), return_url: Some(return_url.into()), confirmation_url: None }
    }
}

//--------------------------------------    PaymentMetadata    ---------------------------------------------------------
/// YooKassa echoes metadata back as strings, even when it was submitted as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<MetadataValue>,
}

impl PaymentMetadata {
    pub fn for_order(order_id: i64) -> Self {
        Self { order_id: Some(MetadataValue::Number(order_id)) }
    }

    /// The order id carried in the metadata, if present and a positive integer.
    pub fn order_id(&self) -> Option<i64> {
        let id = match self.order_id.as_ref()? {
            MetadataValue::Number(n) => *n,
            MetadataValue::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        (id > 0).then_some(id)
    }
}

//--------------------------------------      NewPayment       ---------------------------------------------------------
/// Request body for `POST /payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Amount,
    pub capture: bool,
    pub confirmation: Confirmation,
    pub description: String,
    pub metadata: PaymentMetadata,
}

impl NewPayment {
    /// A single-stage (auto-captured) payment with a redirect confirmation for the given order.
    pub fn for_order(order_id: i64, amount: Rubles, description: &str, return_url: &str) -> Self {
        Self {
            amount: Amount::rubles(amount),
            capture: true,
            confirmation: Confirmation::redirect(return_url),
            description: description.to_string(),
            metadata: PaymentMetadata::for_order(order_id),
        }
    }
}

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    WaitingForCapture,
    Succeeded,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::WaitingForCapture => "waiting_for_capture",
            Self::Succeeded => "succeeded",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

//--------------------------------------        Payment        ---------------------------------------------------------
/// The payment object, as returned by the API and embedded in webhook notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub status: PaymentStatus,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
    #[serde(default)]
    pub metadata: PaymentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Payment {
    pub fn confirmation_url(&self) -> Option<&str> {
        self.confirmation.as_ref().and_then(|c| c.confirmation_url.as_deref())
    }
}

//--------------------------------------     WebhookEvent      ---------------------------------------------------------
/// An incoming notification: `{"type": "notification", "event": "payment.succeeded", "object": {...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub event: String,
    pub object: Payment,
}

impl WebhookEvent {
    pub fn is_payment_succeeded(&self) -> bool {
        self.event == PAYMENT_SUCCEEDED_EVENT
    }

    pub fn payment_id(&self) -> &str {
        self.object.id.as_str()
    }

    pub fn provider_status(&self) -> PaymentStatus {
        self.object.status
    }

    pub fn metadata(&self) -> &PaymentMetadata {
        &self.object.metadata
    }
}
