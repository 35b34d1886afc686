//! Test doubles for the store, cache, catalog and publisher seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use foodstore::bus::{Event, PublishError, Publisher};
use foodstore::cache::{CacheBackend, CacheError};
use foodstore::catalog::{CatalogEntry, CatalogLookup};
use foodstore::store::{
    Document, Filter, FindQuery, InMemoryRecordStore, RecordId, RecordStore, StoreError,
    StoreResult,
};
use foodstore::{ServiceError, ServiceResult};
use rust_decimal::Decimal;

/// In-memory store that counts reads and can be switched off.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryRecordStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    down: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `find_by_id` and `find` calls so far. `count` is not included.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn len(&self, collection: &str) -> usize {
        self.inner.len(collection)
    }

    fn check(&self) -> StoreResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".into()))
        } else {
            Ok(())
        }
    }

    fn read(&self) -> StoreResult<()> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn write(&self) -> StoreResult<()> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<RecordId> {
        self.write()?;
        self.inner.insert(collection, doc).await
    }

    async fn find_by_id(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>> {
        self.read()?;
        self.inner.find_by_id(collection, id).await
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        self.read()?;
        self.inner.find(collection, query).await
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.check()?;
        self.inner.count(collection, filter).await
    }

    async fn update(&self, collection: &str, id: &RecordId, patch: Document) -> StoreResult<()> {
        self.write()?;
        self.inner.update(collection, id, patch).await
    }

    async fn replace(&self, collection: &str, id: &RecordId, doc: Document) -> StoreResult<()> {
        self.write()?;
        self.inner.replace(collection, id, doc).await
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> StoreResult<()> {
        self.write()?;
        self.inner.delete(collection, id).await
    }
}

/// Cache backend that is always unreachable.
#[derive(Default)]
pub struct FailingCache {
    calls: AtomicUsize,
}

impl FailingCache {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> Result<T, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unreachable("connection refused".into()))
    }
}

#[async_trait]
impl CacheBackend for FailingCache {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.fail()
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), CacheError> {
        self.fail()
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        self.fail()
    }

    async fn scan_prefix(&self, _prefix: &str) -> Result<Vec<String>, CacheError> {
        self.fail()
    }
}

/// Publisher that rejects every event.
#[derive(Default)]
pub struct FailingPublisher {
    attempts: AtomicUsize,
}

impl FailingPublisher {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _event: Event) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PublishError::Rejected("bus unreachable".into()))
    }
}

/// Catalog with a fixed price list.
#[derive(Default)]
pub struct StaticCatalog {
    prices: HashMap<String, Decimal>,
    unavailable: bool,
}

impl StaticCatalog {
    pub fn new(prices: &[(&str, Decimal)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(id, price)| (id.to_string(), *price))
                .collect(),
            unavailable: false,
        }
    }

    /// A catalog whose every lookup fails.
    pub fn unreachable() -> Self {
        Self {
            prices: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl CatalogLookup for StaticCatalog {
    async fn resolve(&self, ids: &[String]) -> ServiceResult<Vec<CatalogEntry>> {
        if self.unavailable {
            return Err(ServiceError::UpstreamUnavailable("catalog unreachable".into()));
        }
        let mut seen = Vec::new();
        let mut entries = Vec::new();
        for id in ids {
            if seen.contains(id) {
                continue;
            }
            seen.push(id.clone());
            if let Some(price) = self.prices.get(id) {
                entries.push(CatalogEntry {
                    id: id.clone(),
                    unit_price: *price,
                    available: true,
                });
            }
        }
        Ok(entries)
    }
}
