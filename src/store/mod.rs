//! Record store - the document collection behind menu items and orders.
//!
//! The store is the source of truth. It is modeled as a small capability
//! trait over named collections of JSON documents so a production document
//! database and the in-memory store used in tests and local runs can be
//! swapped freely.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use foodstore::store::{CollectionsExt, FindQuery, Filter, InMemoryRecordStore, RecordStore};
//!
//! let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
//! let id = store.collection::<MenuItem>().insert(&pizza).await?;
//! let mains = store
//!     .collection::<MenuItem>()
//!     .find(&FindQuery::new(Filter::all().eq("category", "Main")))
//!     .await?;
//! ```

mod collection;
mod filter;
mod memory;

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use collection::{Collection, CollectionsExt};
pub use filter::{FindQuery, Filter, Predicate, Sort};
pub use memory::InMemoryRecordStore;

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Field every stored document carries its id under.
pub const ID_FIELD: &str = "id";

/// Trait for types that live in a record store collection.
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this model type (e.g., "menu", "orders").
    const COLLECTION: &'static str;

    /// Returns the store-assigned identifier, empty before insertion.
    fn id(&self) -> &str;
}

/// Store-assigned record identifier: 24 lowercase hex characters.
///
/// Layout follows the document-database object id: 4 bytes of seconds since
/// the epoch, 5 bytes of per-process entropy, 3 bytes of a rolling counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

static PROCESS_UNIQUE: OnceLock<u64> = OnceLock::new();
static COUNTER: AtomicU32 = AtomicU32::new(0);

impl RecordId {
    pub const LEN: usize = 24;

    /// Parse a caller-supplied id. Returns `None` for anything that is not
    /// exactly 24 hex characters.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    /// Issue a fresh id.
    pub fn generate() -> Self {
        let seconds = chrono::Utc::now().timestamp() as u32;
        let process = *PROCESS_UNIQUE.get_or_init(rand::random::<u64>) & 0xff_ffff_ffff;
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;
        Self(format!("{:08x}{:010x}{:06x}", seconds, process, counter))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error type for record store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found: {collection}:{id}")]
    NotFound { collection: String, id: String },
    #[error("document serialization error: {0}")]
    Serde(String),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn not_found(collection: &str, id: &RecordId) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// Abstract document storage.
///
/// Writes to a single document are atomic; nothing else is coordinated here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a document and return the id the store assigned to it.
    async fn insert(&self, collection: &str, doc: Document) -> StoreResult<RecordId>;

    /// Fetch a document by id. `None` when absent.
    async fn find_by_id(&self, collection: &str, id: &RecordId) -> StoreResult<Option<Document>>;

    /// Filter, sort and page a collection.
    async fn find(&self, collection: &str, query: &FindQuery) -> StoreResult<Vec<Document>>;

    /// Count the documents matching a filter, ignoring paging.
    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Set the given top-level fields on an existing document.
    async fn update(&self, collection: &str, id: &RecordId, patch: Document) -> StoreResult<()>;

    /// Replace an existing document wholesale.
    async fn replace(&self, collection: &str, id: &RecordId, doc: Document) -> StoreResult<()>;

    /// Remove a document.
    async fn delete(&self, collection: &str, id: &RecordId) -> StoreResult<()>;
}

pub(crate) fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value).map_err(|e| StoreError::Serde(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serde(format!(
            "expected an object document, got {}",
            other
        ))),
    }
}

pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> StoreResult<T> {
    serde_json::from_value(Value::Object(doc)).map_err(|e| StoreError::Serde(e.to_string()))
}
