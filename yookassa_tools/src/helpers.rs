//! Webhook helpers.
//!
//! YooKassa signs each notification with an HMAC-SHA256 of the raw request body, keyed with the shop's secret key,
//! and sends the lowercase hex digest in the `X-YooKassa-Signature` header.
use hmac::{Hmac, Mac};
use log::{debug, trace};
use sha2::Sha256;

use crate::{WebhookEvent, YooKassaApiError};

pub const SIGNATURE_HEADER: &str = "X-YooKassa-Signature";

type HmacSha256 = Hmac<Sha256>;

/// Calculates the hex-encoded HMAC-SHA256 of `body`.
pub fn calculate_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `signature` against the HMAC of `body`. The comparison is constant-time.
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        debug!("🔐️ Webhook signature is not valid hex");
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let valid = mac.verify_slice(&expected).is_ok();
    trace!("🔐️ Webhook signature valid: {valid}");
    valid
}

/// Parses a raw webhook body into a [`WebhookEvent`].
pub fn parse_webhook_event(body: &[u8]) -> Result<WebhookEvent, YooKassaApiError> {
    serde_json::from_slice::<WebhookEvent>(body).map_err(|e| YooKassaApiError::InvalidNotification(e.to_string()))
}
