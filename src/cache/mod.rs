//! Result cache - read-through memoization in front of the record store.
//!
//! The cache holds JSON snapshots of query results and single records. It is
//! derived state only: every read has a correct fallback through the store,
//! and the cache may be cold, disabled, or unreachable at any moment.
//!
//! ## Failure policy
//!
//! A backend failure never reaches the caller. `get` turns it into a miss;
//! `set`, `delete` and `delete_by_prefix` log it and carry on. A snapshot
//! that no longer deserializes counts as a miss too.
//!
//! ## Prefix invalidation
//!
//! Backends have no native prefix delete, so `delete_by_prefix` scans for
//! matching keys and deletes them one by one. That is O(keys in the cache)
//! per invalidation. Listings are keyed by query, not by record, so there is
//! no record-to-key index to consult instead.
//!
//! ```text
//! caller ──get(key)──▶ ResultCache ──▶ CacheBackend (memory | redis)
//!    │                     │ miss / error
//!    └──────────────▶ RecordStore ──▶ ResultCache::set(key, snapshot)
//! ```

mod key;
mod memory;
#[cfg(feature = "redis")]
mod redis;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use key::CacheKey;
pub use memory::InMemoryCacheBackend;
#[cfg(feature = "redis")]
pub use self::redis::RedisCacheBackend;

/// Expiry applied to every entry unless the caller says otherwise.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Error type for cache backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache unreachable: {0}")]
    Unreachable(String),
    #[error("cache command failed: {0}")]
    Command(String),
}

/// A key-value cache with per-entry expiry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Every live key starting with `prefix`.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError>;
}

/// Bypassable cache handle shared by the services.
///
/// Clone-friendly; clones share the backend.
#[derive(Clone)]
pub struct ResultCache {
    backend: Option<Arc<dyn CacheBackend>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    pub fn from_shared(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
            ttl: DEFAULT_TTL,
        }
    }

    /// A cache that never stores anything; every read goes to the store.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Look up a snapshot. Any failure is reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;
        let bytes = match backend.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "cache read failed, falling through to store");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "cached snapshot unreadable, treating as miss");
                None
            }
        }
    }

    /// Store a snapshot under the default TTL.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.ttl).await
    }

    pub async fn set_with_ttl<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(backend) = &self.backend else {
            return;
        };
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key, error = %e, "could not serialize snapshot, not caching");
                return;
            }
        };
        if let Err(e) = backend.set(key, bytes, ttl).await {
            warn!(key, error = %e, "cache write failed");
        }
    }

    pub async fn delete(&self, key: &str) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Err(e) = backend.delete(key).await {
            warn!(key, error = %e, "cache delete failed; entry lives until its TTL");
        }
    }

    /// Delete every entry whose key starts with `prefix`.
    ///
    /// Scan then delete, so entries written concurrently with the scan may
    /// survive. Keys that fail to delete are logged and skipped.
    pub async fn delete_by_prefix(&self, prefix: &str) {
        let Some(backend) = &self.backend else {
            return;
        };
        let keys = match backend.scan_prefix(prefix).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(prefix, error = %e, "cache scan failed; entries live until their TTL");
                return;
            }
        };
        debug!(prefix, count = keys.len(), "invalidating by prefix");
        for key in keys {
            if let Err(e) = backend.delete(&key).await {
                warn!(key = %key, error = %e, "cache delete failed; entry lives until its TTL");
            }
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(InMemoryCacheBackend::new())
    }
}
