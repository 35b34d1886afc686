//! Shared test doubles and fixtures for the integration suites.

#![allow(dead_code)]

pub mod doubles;

use std::sync::Arc;

use foodstore::bus::InMemoryQueue;
use foodstore::cache::{InMemoryCacheBackend, ResultCache};
use foodstore::catalog::CatalogLookup;
use foodstore::store::RecordStore;
use foodstore::{MenuService, OrderService};

pub use doubles::{CountingStore, FailingCache, FailingPublisher, StaticCatalog};

/// A menu service over a counting store and an in-memory cache.
pub struct MenuFixture {
    pub store: Arc<CountingStore>,
    pub cache: InMemoryCacheBackend,
    pub menu: MenuService,
}

impl MenuFixture {
    pub fn new() -> Self {
        let store = Arc::new(CountingStore::new());
        let cache = InMemoryCacheBackend::new();
        let shared: Arc<dyn RecordStore> = store.clone();
        let menu = MenuService::new(shared, ResultCache::new(cache.clone()));
        Self { store, cache, menu }
    }

    /// Same store, no cache at all.
    pub fn uncached(&self) -> MenuService {
        let shared: Arc<dyn RecordStore> = self.store.clone();
        MenuService::new(shared, ResultCache::disabled())
    }
}

/// An order service over a counting store, an in-memory cache and queue.
pub struct OrderFixture {
    pub store: Arc<CountingStore>,
    pub cache: InMemoryCacheBackend,
    pub queue: InMemoryQueue,
    pub orders: OrderService,
}

impl OrderFixture {
    pub fn new(catalog: impl CatalogLookup + 'static) -> Self {
        let store = Arc::new(CountingStore::new());
        let cache = InMemoryCacheBackend::new();
        let queue = InMemoryQueue::new();
        let shared: Arc<dyn RecordStore> = store.clone();
        let orders = OrderService::new(
            shared,
            ResultCache::new(cache.clone()),
            Arc::new(catalog),
            Arc::new(queue.clone()),
        );
        Self {
            store,
            cache,
            queue,
            orders,
        }
    }
}

pub fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}
