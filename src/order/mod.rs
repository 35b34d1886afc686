//! Order orchestration.
//!
//! Creating an order runs four steps strictly in sequence: resolve prices
//! through the catalog, persist, invalidate cached listings, publish
//! `order.created`. Only the first two can fail the call. The event is a
//! notification, not part of the order: once the order is stored, a publish
//! failure is logged and the call still succeeds.
//!
//! Every mutation drops the order's by-id entry and every cached per-user
//! listing, so a read after a write never sees the pre-write snapshot.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::bus::{Event, Publisher};
use crate::cache::{CacheKey, ResultCache};
use crate::catalog::CatalogLookup;
use crate::error::{ServiceError, ServiceResult};
use crate::model::{Order, OrderReplacement, OrderStatus};
use crate::store::{Collection, CollectionsExt, Document, Filter, FindQuery, Model, RecordId, RecordStore};

/// Topic order-created events go to unless configured otherwise.
pub const DEFAULT_TOPIC: &str = "order.created";

/// Payload of the order-created event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<String>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderCreated {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            items: order.item_ids.clone(),
            total: order.total_price,
            created_at: order.created_at,
        }
    }
}

/// Order creation and maintenance.
///
/// Clone-friendly; clones share every collaborator.
#[derive(Clone)]
pub struct OrderService {
    orders: Collection<Order>,
    cache: ResultCache,
    catalog: Arc<dyn CatalogLookup>,
    publisher: Arc<dyn Publisher>,
    topic: String,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: ResultCache,
        catalog: Arc<dyn CatalogLookup>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            orders: store.collection::<Order>(),
            cache,
            catalog,
            publisher,
            topic: DEFAULT_TOPIC.to_string(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Price and place a new `Pending` order.
    ///
    /// Ids the catalog cannot resolve contribute nothing to the total. Each
    /// occurrence of a resolved id is charged, so `["a", "a"]` costs twice
    /// the unit price of `a`. Record ids match case-insensitively, the way
    /// the catalog resolves them.
    pub async fn create_order(&self, user_id: &str, item_ids: Vec<String>) -> ServiceResult<RecordId> {
        let entries = self.catalog.resolve(&item_ids).await?;
        let prices: HashMap<String, Decimal> = entries
            .into_iter()
            .map(|entry| (entry.id, entry.unit_price))
            .collect();
        let total_price: Decimal = item_ids
            .iter()
            .filter_map(|id| prices.get(&catalog_id(id)).copied())
            .sum();

        let mut order = Order {
            id: String::new(),
            user_id: user_id.to_string(),
            item_ids,
            total_price,
            status: OrderStatus::pending(),
            created_at: Utc::now(),
        };
        let id = self.orders.insert(&order).await?;
        order.id = id.to_string();
        info!(order_id = %id, user_id, total = %total_price, "order created");

        self.invalidate_user_listings().await;
        self.publish_created(&order).await;
        Ok(id)
    }

    /// Read-through lookup by id.
    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Order> {
        let record_id = parse_id(id)?;
        let key = order_key(&record_id);
        if let Some(order) = self.cache.get::<Order>(&key).await {
            return Ok(order);
        }

        let order = self
            .orders
            .get(&record_id)
            .await?
            .ok_or_else(|| not_found(id))?;
        self.cache.set(&key, &order).await;
        Ok(order)
    }

    /// Read-through listing of one user's orders, in placement order.
    pub async fn list_by_user(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        let key = user_key(user_id);
        if let Some(orders) = self.cache.get::<Vec<Order>>(&key).await {
            return Ok(orders);
        }

        let orders = self
            .orders
            .find(&FindQuery::new(Filter::all().eq("user_id", user_id)))
            .await?;
        self.cache.set(&key, &orders).await;
        Ok(orders)
    }

    /// Every order, in placement order. Not cached. `limit == 0` means no
    /// limit.
    pub async fn list_all(&self, limit: u64, skip: u64) -> ServiceResult<Vec<Order>> {
        let query = FindQuery::new(Filter::all()).limit(limit).skip(skip);
        Ok(self.orders.find(&query).await?)
    }

    /// Set the status label. No transition rules apply.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> ServiceResult<()> {
        let record_id = parse_id(id)?;
        if status.as_str().is_empty() {
            return Err(ServiceError::Invalid("order status must not be empty".into()));
        }

        let mut patch = Document::new();
        patch.insert("status".to_string(), Value::String(status.to_string()));
        self.orders.update(&record_id, patch).await?;
        self.invalidate_order(&record_id).await;
        info!(order_id = %record_id, status = %status, "order status updated");
        Ok(())
    }

    /// Replace every mutable field. The total is taken as given; the stored
    /// creation time is kept.
    pub async fn full_update(&self, id: &str, replacement: OrderReplacement) -> ServiceResult<()> {
        let record_id = parse_id(id)?;
        if replacement.total_price.is_sign_negative() && !replacement.total_price.is_zero() {
            return Err(ServiceError::Invalid(format!(
                "total price must not be negative, got {}",
                replacement.total_price
            )));
        }
        let existing = self
            .orders
            .get(&record_id)
            .await?
            .ok_or_else(|| not_found(id))?;

        let order = Order {
            id: record_id.to_string(),
            user_id: replacement.user_id,
            item_ids: replacement.item_ids,
            total_price: replacement.total_price,
            status: replacement.status,
            created_at: existing.created_at,
        };
        self.orders.replace(&record_id, &order).await?;
        self.invalidate_order(&record_id).await;
        info!(order_id = %record_id, "order replaced");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let record_id = parse_id(id)?;
        self.orders.delete(&record_id).await?;
        self.invalidate_order(&record_id).await;
        info!(order_id = %record_id, "order deleted");
        Ok(())
    }

    async fn publish_created(&self, order: &Order) {
        let event = match Event::encode(
            RecordId::generate().to_string(),
            self.topic.as_str(),
            &OrderCreated::from(order),
        ) {
            Ok(event) => event.with_metadata("order_id", order.id.as_str()),
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "could not encode order event");
                return;
            }
        };
        if let Err(e) = self.publisher.publish(event).await {
            warn!(order_id = %order.id, topic = %self.topic, error = %e, "order event not published");
        }
    }

    async fn invalidate_order(&self, id: &RecordId) {
        self.cache.delete(&order_key(id)).await;
        self.invalidate_user_listings().await;
    }

    async fn invalidate_user_listings(&self) {
        self.cache
            .delete_by_prefix(&CacheKey::prefix("orders", "user"))
            .await;
    }
}

fn order_key(id: &RecordId) -> String {
    CacheKey::new("order", "id").param("id", id).render()
}

fn user_key(user_id: &str) -> String {
    CacheKey::new("orders", "user").param("user_id", user_id).render()
}

/// The form the catalog reports an id in: record ids lowercased, anything
/// else as given.
fn catalog_id(id: &str) -> String {
    RecordId::parse(id)
        .map(|record_id| record_id.to_string())
        .unwrap_or_else(|| id.to_string())
}

fn parse_id(id: &str) -> ServiceResult<RecordId> {
    RecordId::parse(id).ok_or_else(|| not_found(id))
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("{}:{}", Order::COLLECTION, id))
}
