//! Menu browsing and menu maintenance.
//!
//! Listings are read through the result cache, keyed by the full query.
//! The total count is never cached: it comes straight from the store on
//! every call. Single-item reads are not cached either. Every write drops
//! all cached listings, since any of them might contain the changed item.

pub mod handlers;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{CacheKey, ResultCache};
use crate::error::{ServiceError, ServiceResult};
use crate::model::{MenuItem, MenuItemPatch};
use crate::store::{
    Collection, CollectionsExt, Filter, FindQuery, Model, RecordId, RecordStore, Sort,
};

const ENTITY: &str = "menu";
const LIST: &str = "list";

/// Which items a listing covers. Unset and empty fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuFilter {
    /// Exact category match.
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive substring of the name or the description.
    #[serde(default)]
    pub search: Option<String>,
}

impl MenuFilter {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn to_filter(&self) -> Filter {
        let mut filter = Filter::all();
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            filter = filter.eq("category", category);
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            filter = filter.contains_ignore_case(&["name", "description"], search);
        }
        filter
    }
}

/// A menu listing request. `limit == 0` means no limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuQuery {
    pub filter: MenuFilter,
    pub sort: Option<Sort>,
    pub limit: u64,
    pub skip: u64,
}

impl MenuQuery {
    pub fn new(filter: MenuFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }
}

/// One page of a listing plus the number of items matching the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuPage {
    pub items: Vec<MenuItem>,
    pub total_count: u64,
}

/// Menu data access with a read-through cache in front of listings.
///
/// Clone-friendly; clones share the store and the cache.
#[derive(Clone)]
pub struct MenuService {
    items: Collection<MenuItem>,
    cache: ResultCache,
}

impl MenuService {
    pub fn new(store: Arc<dyn RecordStore>, cache: ResultCache) -> Self {
        Self {
            items: store.collection::<MenuItem>(),
            cache,
        }
    }

    /// Filter, sort and page the menu.
    pub async fn list(&self, query: &MenuQuery) -> ServiceResult<MenuPage> {
        let filter = query.filter.to_filter();
        let total_count = self.items.count(&filter).await?;

        let find = FindQuery::new(filter)
            .sort(query.sort.clone())
            .limit(query.limit)
            .skip(query.skip);
        let items = self.find_items(&find).await?;

        Ok(MenuPage { items, total_count })
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<MenuItem> {
        let record_id = parse_id(id)?;
        self.items
            .get(&record_id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetch every item whose id is listed. Malformed and unknown ids are
    /// skipped; the result follows the store's natural order.
    pub async fn get_multiple(&self, ids: &[String]) -> ServiceResult<Vec<MenuItem>> {
        let valid: Vec<RecordId> = ids.iter().filter_map(|id| RecordId::parse(id)).collect();
        self.find_items(&FindQuery::new(Filter::all().id_in(valid)))
            .await
    }

    pub async fn count(&self, filter: &MenuFilter) -> ServiceResult<u64> {
        Ok(self.items.count(&filter.to_filter()).await?)
    }

    /// Add an item. Whatever id it carries is replaced by the store's.
    pub async fn create(&self, item: MenuItem) -> ServiceResult<RecordId> {
        item.validate()?;
        let id = self.items.insert(&item).await?;
        self.invalidate_listings().await;
        info!(id = %id, name = %item.name, "menu item created");
        Ok(id)
    }

    /// Change only the fields the patch sets.
    pub async fn update(&self, id: &str, patch: MenuItemPatch) -> ServiceResult<()> {
        let record_id = parse_id(id)?;
        if patch.is_empty() {
            return Err(ServiceError::Invalid("menu item patch sets no fields".into()));
        }
        self.items.update(&record_id, patch.into_document()?).await?;
        self.invalidate_listings().await;
        info!(id, "menu item updated");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let record_id = parse_id(id)?;
        self.items.delete(&record_id).await?;
        self.invalidate_listings().await;
        info!(id, "menu item deleted");
        Ok(())
    }

    async fn find_items(&self, query: &FindQuery) -> ServiceResult<Vec<MenuItem>> {
        let key = list_key(query);
        if let Some(items) = self.cache.get::<Vec<MenuItem>>(&key).await {
            return Ok(items);
        }

        let items = self.items.find(query).await?;
        self.cache.set(&key, &items).await;
        Ok(items)
    }

    async fn invalidate_listings(&self) {
        self.cache
            .delete_by_prefix(&CacheKey::prefix(ENTITY, LIST))
            .await;
    }
}

fn list_key(query: &FindQuery) -> String {
    CacheKey::new(ENTITY, LIST)
        .filter(&query.filter)
        .sort(query.sort.as_ref())
        .param("limit", query.limit)
        .param("skip", query.skip)
        .render()
}

fn parse_id(id: &str) -> ServiceResult<RecordId> {
    RecordId::parse(id).ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("{}:{}", MenuItem::COLLECTION, id))
}
