//! Domain records: menu items and orders.
//!
//! Both are stored as JSON documents under the field names their serde
//! representation uses, which are also the names filters and sorts refer to.

mod menu_item;
mod order;

pub use menu_item::{MenuItem, MenuItemPatch};
pub use order::{Order, OrderReplacement, OrderStatus};
