//! InMemoryRecordStore - HashMap-backed record store for testing and development.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    Document, Filter, FindQuery, RecordId, RecordStore, StoreError, StoreResult, ID_FIELD,
};

/// One collection: documents keyed by insertion sequence, plus an id index.
#[derive(Default)]
struct CollectionData {
    next_seq: u64,
    by_seq: BTreeMap<u64, Document>,
    index: HashMap<RecordId, u64>,
}

impl CollectionData {
    fn get(&self, id: &RecordId) -> Option<&Document> {
        self.index.get(id).and_then(|seq| self.by_seq.get(seq))
    }

    fn get_mut(&mut self, id: &RecordId) -> Option<&mut Document> {
        let seq = *self.index.get(id)?;
        self.by_seq.get_mut(&seq)
    }
}

/// In-memory record store.
///
/// Natural order is insertion order. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryRecordStore {
    collections: Arc<RwLock<HashMap<String, CollectionData>>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map(|data| data.by_seq.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("lock poisoned".into())
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, collection: &str, mut doc: Document) -> StoreResult<RecordId> {
        let id = RecordId::generate();
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let data = collections.entry(collection.to_string()).or_default();
        let seq = data.next_seq;
        data.next_seq += 1;
        data.by_seq.insert(seq, doc);
        data.index.insert(id.clone(), seq);

        Ok(id)
    }

    async fn find_by_id(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .and_then(|data| data.get(id))
            .cloned())
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        let Some(data) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Document> = data
            .by_seq
            .values()
            .filter(|doc| query.filter.matches(doc))
            .collect();

        if let Some(sort) = &query.sort {
            // Stable, so ties keep insertion order.
            matched.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(query.page(matched.into_iter().cloned()))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let collections = self.collections.read().map_err(|_| poisoned())?;
        Ok(collections
            .get(collection)
            .map(|data| data.by_seq.values().filter(|doc| filter.matches(doc)).count() as u64)
            .unwrap_or(0))
    }

    async fn update(&self, collection: &str, id: &RecordId, patch: Document) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let doc = collections
            .get_mut(collection)
            .and_then(|data| data.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        for (field, value) in patch {
            if field != ID_FIELD {
                doc.insert(field, value);
            }
        }
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &RecordId, mut doc: Document) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let stored = collections
            .get_mut(collection)
            .and_then(|data| data.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        *stored = doc;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let data = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let seq = data
            .index
            .remove(id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        data.by_seq.remove(&seq);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Sort;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter()
            .map(|d| d.get("name").and_then(Value::as_str).unwrap())
            .collect()
    }

    async fn seeded() -> InMemoryRecordStore {
        let store = InMemoryRecordStore::new();
        for (name, price, category) in [
            ("Pizza", 9.99, "Main"),
            ("Tiramisu", 5.5, "Dessert"),
            ("Burger", 7.25, "Main"),
            ("Salad", 4.0, "Starter"),
        ] {
            store
                .insert(
                    "menu",
                    doc(json!({ "name": name, "price": price, "category": category })),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn insert_assigns_id_and_find_by_id_returns_it() {
        let store = InMemoryRecordStore::new();
        let id = store
            .insert("menu", doc(json!({ "name": "Pizza" })))
            .await
            .unwrap();

        let loaded = store.find_by_id("menu", &id).await.unwrap().unwrap();
        assert_eq!(loaded.get("id"), Some(&json!(id.as_str())));
        assert_eq!(loaded.get("name"), Some(&json!("Pizza")));
    }

    #[tokio::test]
    async fn find_by_id_missing_is_none() {
        let store = seeded().await;
        let missing = RecordId::generate();
        assert!(store.find_by_id("menu", &missing).await.unwrap().is_none());
        assert!(store.find_by_id("orders", &missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_without_sort_uses_insertion_order() {
        let store = seeded().await;
        let all = store
            .find("menu", &FindQuery::new(Filter::all()))
            .await
            .unwrap();
        assert_eq!(names(&all), vec!["Pizza", "Tiramisu", "Burger", "Salad"]);
    }

    #[tokio::test]
    async fn find_filters_sorts_and_pages() {
        let store = seeded().await;
        let query = FindQuery::new(Filter::all().eq("category", "Main"))
            .sort(Some(Sort::ascending("price")));
        let mains = store.find("menu", &query).await.unwrap();
        assert_eq!(names(&mains), vec!["Burger", "Pizza"]);

        let query = FindQuery::new(Filter::all())
            .sort(Some(Sort::descending("price")))
            .skip(1)
            .limit(2);
        let page = store.find("menu", &query).await.unwrap();
        assert_eq!(names(&page), vec!["Burger", "Tiramisu"]);
    }

    #[tokio::test]
    async fn count_ignores_paging() {
        let store = seeded().await;
        assert_eq!(store.count("menu", &Filter::all()).await.unwrap(), 4);
        assert_eq!(
            store
                .count("menu", &Filter::all().eq("category", "Main"))
                .await
                .unwrap(),
            2
        );
        assert_eq!(store.count("orders", &Filter::all()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_sets_fields_but_never_the_id() {
        let store = InMemoryRecordStore::new();
        let id = store
            .insert("menu", doc(json!({ "name": "Pizza", "price": 9.99 })))
            .await
            .unwrap();

        store
            .update(
                "menu",
                &id,
                doc(json!({ "price": 11.5, "id": "ffffffffffffffffffffffff" })),
            )
            .await
            .unwrap();

        let loaded = store.find_by_id("menu", &id).await.unwrap().unwrap();
        assert_eq!(loaded.get("price"), Some(&json!(11.5)));
        assert_eq!(loaded.get("name"), Some(&json!("Pizza")));
        assert_eq!(loaded.get("id"), Some(&json!(id.as_str())));
    }

    #[tokio::test]
    async fn replace_drops_fields_not_supplied() {
        let store = InMemoryRecordStore::new();
        let id = store
            .insert("orders", doc(json!({ "status": "Pending", "note": "x" })))
            .await
            .unwrap();

        store
            .replace("orders", &id, doc(json!({ "status": "Completed" })))
            .await
            .unwrap();

        let loaded = store.find_by_id("orders", &id).await.unwrap().unwrap();
        assert_eq!(loaded.get("status"), Some(&json!("Completed")));
        assert!(loaded.get("note").is_none());
        assert_eq!(loaded.get("id"), Some(&json!(id.as_str())));
    }

    #[tokio::test]
    async fn writes_to_missing_records_are_not_found() {
        let store = seeded().await;
        let missing = RecordId::generate();

        let err = store.update("menu", &missing, Document::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.replace("menu", &missing, Document::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store.delete("menu", &missing).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = seeded().await;
        let first = store
            .find("menu", &FindQuery::new(Filter::all()).limit(1))
            .await
            .unwrap();
        let id = RecordId::parse(first[0]["id"].as_str().unwrap()).unwrap();

        store.delete("menu", &id).await.unwrap();
        assert!(store.find_by_id("menu", &id).await.unwrap().is_none());
        assert_eq!(store.len("menu"), 3);
    }

    #[tokio::test]
    async fn clone_shares_storage() {
        let store = InMemoryRecordStore::new();
        let clone = store.clone();
        let id = store
            .insert("menu", doc(json!({ "name": "Pizza" })))
            .await
            .unwrap();
        assert!(clone.find_by_id("menu", &id).await.unwrap().is_some());
    }
}
