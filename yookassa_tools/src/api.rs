use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::YooKassaConfig, NewPayment, Payment, YooKassaApiError};

pub const IDEMPOTENCE_KEY_HEADER: &str = "Idempotence-Key";

#[derive(Clone)]
pub struct YooKassaApi {
    config: YooKassaConfig,
    client: Arc<Client>,
}

impl YooKassaApi {
    pub fn new(config: YooKassaConfig) -> Result<Self, YooKassaApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| YooKassaApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &YooKassaConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        idempotence_key: Option<&str>,
        body: Option<B>,
    ) -> Result<T, YooKassaApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self
            .client
            .request(method, url)
            .basic_auth(&self.config.account_id, Some(self.config.secret_key.reveal()));
        if let Some(key) = idempotence_key {
            req = req.header(IDEMPOTENCE_KEY_HEADER, key);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                YooKassaApiError::Timeout(e.to_string())
            } else {
                YooKassaApiError::Transport(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| YooKassaApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| YooKassaApiError::Transport(e.to_string()))?;
            Err(YooKassaApiError::QueryError { status, message })
        }
    }

    /// Registers a new payment with YooKassa.
    ///
    /// Requests that carry the same `idempotence_key` return the payment that was created by the first of them, so a
    /// retry after a lost response cannot create a second charge.
    pub async fn create_payment(
        &self,
        payment: &NewPayment,
        idempotence_key: &str,
    ) -> Result<Payment, YooKassaApiError> {
        debug!("💳️ Creating payment of {} for '{}'", payment.amount, payment.description);
        let result =
            self.rest_query::<Payment, &NewPayment>(Method::POST, "/payments", Some(idempotence_key), Some(payment)).await?;
        info!("💳️ Created payment {} ({})", result.id, result.status);
        Ok(result)
    }
}
