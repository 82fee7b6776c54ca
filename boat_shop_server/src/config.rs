use std::{env, time::Duration as StdDuration};

use boat_order_engine::{
    order_objects::{DEFAULT_LIST_CACHE_TTL_SECONDS, DEFAULT_PAYMENT_WINDOW_SECONDS, DEFAULT_RECONCILE_AFTER_SECONDS},
    OrderFlowConfig,
};
use chrono::Duration;
use log::*;
use rand::RngCore;
use shop_common::{
    helpers::{parse_boolean_flag, parse_env_var},
    Secret,
};
use yookassa_tools::YooKassaConfig;

use crate::errors::ServerError;

const DEFAULT_SHOP_HOST: &str = "127.0.0.1";
const DEFAULT_SHOP_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/boat_shop.db";
const DEFAULT_EXPIRY_SWEEP_SECONDS: u64 = 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Credentials and endpoints for the payment provider.
    pub yookassa: YooKassaConfig,
    /// If false, webhook calls are accepted without checking their signature. **DANGER**
    pub webhook_signature_checks: bool,
    /// Payment window, listing cache TTL and reconciliation threshold for the order engine.
    pub order_flow: OrderFlowConfig,
    /// How often the expiry and reconciliation sweeps run. `None` disables them.
    pub sweep_interval: Option<StdDuration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SHOP_HOST.to_string(),
            port: DEFAULT_SHOP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            yookassa: YooKassaConfig::default(),
            webhook_signature_checks: true,
            order_flow: OrderFlowConfig::default(),
            sweep_interval: Some(StdDuration::from_secs(DEFAULT_EXPIRY_SWEEP_SECONDS)),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SHOP_HOST").ok().unwrap_or_else(|| DEFAULT_SHOP_HOST.into());
        let port = env::var("SHOP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SHOP_PORT. {e} Using the default, {DEFAULT_SHOP_PORT}, instead."
                    );
                    DEFAULT_SHOP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SHOP_PORT);
        let database_url = env::var("SHOP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SHOP_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!("🪛️ Could not load the authentication configuration. {e}. Reverting to the default configuration.");
            AuthConfig::default()
        });
        let yookassa = YooKassaConfig::new_from_env_or_default();
        let webhook_signature_checks = parse_boolean_flag(env::var("PAYMENT_WEBHOOK_SIGNATURE_CHECKS").ok(), true);
        if !webhook_signature_checks {
            warn!(
                "🚨️🚨️🚨️ Webhook signature checks are DISABLED. Anyone can mark orders as paid. Never run production \
                 like this. 🚨️🚨️🚨️"
            );
        }
        let order_flow = configure_order_flow();
        let sweep_interval = configure_sweep_interval();
        Self { host, port, database_url, auth, yookassa, webhook_signature_checks, order_flow, sweep_interval }
    }
}

/// Reads a number of seconds from `name`, logging and falling back to `default` if the value is missing or invalid.
fn seconds_from_env(name: &str, default: u64) -> u64 {
    match parse_env_var::<u64>(name) {
        Ok(Some(secs)) => secs,
        Ok(None) => {
            info!("🪛️ {name} is not set. Using the default value of {default}s.");
            default
        },
        Err((s, e)) => {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e}. Using the default value of {default}s.");
            default
        },
    }
}

/// Like [`seconds_from_env`], for settings that are compared against timestamps.
fn span_from_env(name: &str, default: i64) -> Duration {
    let secs = seconds_from_env(name, default.unsigned_abs());
    seconds_to_span(name, secs, default)
}

/// Values too large for a timestamp offset are logged and replaced by `default`.
fn seconds_to_span(name: &str, secs: u64, default: i64) -> Duration {
    match Duration::from_std(StdDuration::from_secs(secs)) {
        Ok(span) if span < Duration::days(365_000) => span,
        _ => {
            warn!("🪛️ {name} is too large ({secs}s). Using the default value of {default}s.");
            Duration::seconds(default)
        },
    }
}

fn configure_order_flow() -> OrderFlowConfig {
    let list_cache_ttl = seconds_from_env("CACHE_TTL_ORDERS_SECONDS", DEFAULT_LIST_CACHE_TTL_SECONDS);
    OrderFlowConfig {
        payment_window: span_from_env("ORDER_PAYMENT_WINDOW_SECONDS", DEFAULT_PAYMENT_WINDOW_SECONDS),
        list_cache_ttl: StdDuration::from_secs(list_cache_ttl),
        reconcile_after: span_from_env("ORDER_RECONCILE_AFTER_SECONDS", DEFAULT_RECONCILE_AFTER_SECONDS),
    }
}

fn configure_sweep_interval() -> Option<StdDuration> {
    match seconds_from_env("ORDER_EXPIRY_SWEEP_SECONDS", DEFAULT_EXPIRY_SWEEP_SECONDS) {
        0 => {
            warn!("🪛️ ORDER_EXPIRY_SWEEP_SECONDS is 0. Unpaid orders will not expire and orphaned orders will not be \
                   reconciled.");
            None
        },
        secs => Some(StdDuration::from_secs(secs)),
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The HS256 key shared with the service that issues access tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No access token \
             issued elsewhere will be accepted. Set SHOP_JWT_SECRET. 🚨️🚨️🚨️"
        );
        let mut key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key);
        Self { jwt_secret: Secret::new(hex::encode(key)) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("SHOP_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [SHOP_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("SHOP_JWT_SECRET is empty".to_string()));
        }
        Ok(Self::new(secret))
    }
}
