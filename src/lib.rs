//! Menu and order services for a food-ordering platform.
//!
//! - [`menu::MenuService`] browses and maintains the menu with a
//!   read-through result cache in front of listings.
//! - [`order::OrderService`] prices orders through a [`catalog::CatalogLookup`],
//!   persists them, keeps cached lookups fresh and publishes `order.created`.
//! - [`rpc`] exposes both as named JSON commands over HTTP or gRPC.
//!
//! Collaborators sit behind small traits, each with an in-memory
//! implementation: [`store::RecordStore`], [`cache::CacheBackend`],
//! [`catalog::CatalogLookup`] and [`bus::Publisher`].

pub mod bootstrap;
pub mod bus;
pub mod cache;
pub mod catalog;
pub mod config;
mod error;
pub mod menu;
pub mod model;
pub mod observability;
pub mod order;
pub mod rpc;
pub mod store;

pub use error::{ServiceError, ServiceResult};
pub use menu::{MenuFilter, MenuPage, MenuQuery, MenuService};
pub use model::{MenuItem, MenuItemPatch, Order, OrderReplacement, OrderStatus};
pub use order::{OrderCreated, OrderService};
