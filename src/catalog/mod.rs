//! Catalog lookup - resolves item ids to their current unit price.
//!
//! The order service never reads the menu collection directly. It asks a
//! [`CatalogLookup`], which in a single process is [`MenuCatalog`] and across
//! processes is `GrpcCatalog` talking to a remote menu service.

#[cfg(feature = "grpc")]
mod grpc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ServiceResult;
use crate::menu::MenuService;
use crate::model::MenuItem;

#[cfg(feature = "grpc")]
pub use grpc::GrpcCatalog;

/// Current price and availability of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub unit_price: Decimal,
    pub available: bool,
}

impl From<MenuItem> for CatalogEntry {
    fn from(item: MenuItem) -> Self {
        Self {
            id: item.id,
            unit_price: item.price,
            available: item.available,
        }
    }
}

/// Resolve item ids against the catalog.
///
/// Ids the catalog does not know are absent from the result; that is not an
/// error. Each id appears at most once in the result no matter how often it
/// was asked for.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn resolve(&self, ids: &[String]) -> ServiceResult<Vec<CatalogEntry>>;
}

/// In-process catalog over a [`MenuService`].
#[derive(Clone)]
pub struct MenuCatalog {
    menu: MenuService,
}

impl MenuCatalog {
    pub fn new(menu: MenuService) -> Self {
        Self { menu }
    }
}

#[async_trait]
impl CatalogLookup for MenuCatalog {
    async fn resolve(&self, ids: &[String]) -> ServiceResult<Vec<CatalogEntry>> {
        let items = self.menu.get_multiple(ids).await?;
        Ok(items.into_iter().map(CatalogEntry::from).collect())
    }
}
