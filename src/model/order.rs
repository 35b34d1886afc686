use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::store::Model;

/// Order status label.
///
/// Statuses are caller-extensible: any string is accepted and stored as is.
/// `Pending` and `Completed` are the values this crate itself produces or
/// that the storefront is known to send.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    pub const PENDING: &'static str = "Pending";
    pub const COMPLETED: &'static str = "Completed";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn pending() -> Self {
        Self::new(Self::PENDING)
    }

    pub fn completed() -> Self {
        Self::new(Self::COMPLETED)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_well_known(&self) -> bool {
        matches!(self.0.as_str(), Self::PENDING | Self::COMPLETED)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderStatus {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for OrderStatus {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned by the store on insert; empty before that.
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    /// One entry per unit ordered; duplicates are meaningful.
    pub item_ids: Vec<String>,
    /// Computed at creation. Only a full update replaces it.
    pub total_price: Decimal,
    pub status: OrderStatus,
    /// Set once at creation.
    pub created_at: DateTime<Utc>,
}

impl Model for Order {
    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Caller-supplied contents for a full order update.
///
/// The total is trusted as given and not recomputed from `item_ids`; the
/// stored `created_at` is carried over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReplacement {
    pub user_id: String,
    pub item_ids: Vec<String>,
    pub total_price: Decimal,
    pub status: OrderStatus,
}
