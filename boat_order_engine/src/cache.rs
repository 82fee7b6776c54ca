//! Read cache for order listings.
//!
//! Entries are namespaced strings (`{namespace}:{hash}`) holding JSON. Every write to an order purges the whole
//! `orders_list` namespace. Purging is best-effort: a purge that fails is logged, and the stale entry disappears when
//! its TTL runs out.
use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use blake2::{Blake2s256, Digest};
use log::*;
use thiserror::Error;
use tokio::{sync::RwLock, time::Instant};

pub const ORDERS_LIST_NAMESPACE: &str = "orders_list";

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("Could not (de)serialize cache entry: {0}")]
    Serialization(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

#[async_trait]
pub trait OrderCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Removes every key in `namespace`, returning the number of keys removed.
    async fn purge_namespace(&self, namespace: &str) -> Result<usize, CacheError>;
}

/// Builds a cache key in `namespace` from the given parts, e.g. `orders_list:5f1c…`.
pub fn cache_key(namespace: &str, parts: &[&str]) -> String {
    let mut hasher = Blake2s256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let hash = digest.iter().take(16).map(|b| format!("{b:02x}")).collect::<String>();
    format!("{namespace}:{hash}")
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// A single-process cache backed by a map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.values().filter(|e| !e.is_expired()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrderCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                drop(store);
                self.store.write().await.remove(key);
                trace!("🗃️ Cache entry {key} expired");
                Ok(None)
            },
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry { value, expires_at: Instant::now() + ttl };
        self.store.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn purge_namespace(&self, namespace: &str) -> Result<usize, CacheError> {
        let prefix = format!("{namespace}:");
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|k, _| !k.starts_with(&prefix));
        let removed = before - store.len();
        trace!("🗃️ Purged {removed} entries from cache namespace {namespace}");
        Ok(removed)
    }
}
