//! Collection - Typed accessor for one model type in a record store.

use std::marker::PhantomData;
use std::sync::Arc;

use super::{
    from_document, to_document, Document, Filter, FindQuery, Model, RecordId, RecordStore,
    StoreResult,
};

/// Typed wrapper for accessing the documents of a specific model type.
pub struct Collection<M> {
    store: Arc<dyn RecordStore>,
    _marker: PhantomData<fn() -> M>,
}

impl<M> Clone for Collection<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<M: Model> Collection<M> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Insert a model. Whatever id it carries is overwritten by the store's.
    pub async fn insert(&self, model: &M) -> StoreResult<RecordId> {
        self.store.insert(M::COLLECTION, to_document(model)?).await
    }

    /// Get a model by id.
    pub async fn get(&self, id: &RecordId) -> StoreResult<Option<M>> {
        match self.store.find_by_id(M::COLLECTION, id).await? {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Filter, sort and page.
    pub async fn find(&self, query: &FindQuery) -> StoreResult<Vec<M>> {
        self.store
            .find(M::COLLECTION, query)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        self.store.count(M::COLLECTION, filter).await
    }

    /// Set the given fields on an existing model.
    pub async fn update(&self, id: &RecordId, patch: Document) -> StoreResult<()> {
        self.store.update(M::COLLECTION, id, patch).await
    }

    /// Replace an existing model wholesale.
    pub async fn replace(&self, id: &RecordId, model: &M) -> StoreResult<()> {
        self.store
            .replace(M::COLLECTION, id, to_document(model)?)
            .await
    }

    pub async fn delete(&self, id: &RecordId) -> StoreResult<()> {
        self.store.delete(M::COLLECTION, id).await
    }
}

/// Extension trait for typed collection access on a shared store handle.
pub trait CollectionsExt {
    /// Get a typed collection.
    fn collection<M: Model>(&self) -> Collection<M>;
}

impl CollectionsExt for Arc<dyn RecordStore> {
    fn collection<M: Model>(&self) -> Collection<M> {
        Collection::new(Arc::clone(self))
    }
}
