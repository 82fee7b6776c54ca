use std::time::Duration;

use log::*;
use shop_common::{helpers::parse_env_var, Secret};

pub const DEFAULT_API_URL: &str = "https://api.yookassa.ru/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct YooKassaConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub api_url: String,
    /// The shop id (`shopId`) issued by YooKassa. Used as the basic-auth username.
    pub account_id: String,
    /// The secret key for the shop. Used as the basic-auth password and as the webhook HMAC key.
    pub secret_key: Secret<String>,
    /// Where YooKassa redirects the customer after payment.
    pub return_url: String,
    /// Upper bound on a single API call. Exceeding it is treated as the provider being unavailable.
    pub timeout: Duration,
}

impl Default for YooKassaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            account_id: String::default(),
            secret_key: Secret::default(),
            return_url: String::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl YooKassaConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("PAYMENT_PROVIDER_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let account_id = std::env::var("PAYMENT_PROVIDER_ACCOUNT").unwrap_or_else(|_| {
            warn!("💳️ PAYMENT_PROVIDER_ACCOUNT not set. Payment creation will be rejected by YooKassa.");
            String::default()
        });
        let secret_key = Secret::new(std::env::var("PAYMENT_PROVIDER_SECRET").unwrap_or_else(|_| {
            warn!("💳️ PAYMENT_PROVIDER_SECRET not set. Payment creation and webhook signature checks will fail.");
            String::default()
        }));
        let return_url = std::env::var("PAYMENT_RETURN_URL").unwrap_or_else(|_| {
            warn!("💳️ PAYMENT_RETURN_URL not set, customers will be returned to http://localhost:8000/orders/");
            "http://localhost:8000/orders/".to_string()
        });
        let timeout = match parse_env_var::<u64>("PAYMENT_PROVIDER_TIMEOUT_SECONDS") {
            Ok(Some(secs)) if secs > 0 => Duration::from_secs(secs),
            Ok(_) => DEFAULT_TIMEOUT,
            Err((s, e)) => {
                warn!("💳️ Invalid PAYMENT_PROVIDER_TIMEOUT_SECONDS ({s}): {e}. Using {}s", DEFAULT_TIMEOUT.as_secs());
                DEFAULT_TIMEOUT
            },
        };
        Self { api_url, account_id, secret_key, return_url, timeout }
    }
}
