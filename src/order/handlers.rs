//! RPC handlers for the order service, one module per command.

use serde_json::Value;

use super::OrderService;
use crate::rpc::{Context, HandlerError, Service};

/// Build the order command service.
pub fn service(orders: OrderService) -> Service<OrderService> {
    crate::register_handlers!(
        Service::new(orders),
        create,
        get,
        list_by_user,
        list,
        patch_status,
        update,
        delete,
    )
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(|e| HandlerError::Other(Box::new(e)))
}

pub mod create {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    pub const COMMAND: &str = "order.create";

    #[derive(Deserialize)]
    pub struct Input {
        pub user_id: String,
        #[serde(default)]
        pub item_ids: Vec<String>,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["user_id", "item_ids"])
    }

    pub async fn handle(ctx: Context<OrderService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        let id = ctx
            .state()
            .create_order(&input.user_id, input.item_ids)
            .await?;
        Ok(json!({ "id": id }))
    }
}

pub mod get {
    use serde::Deserialize;

    use super::*;

    pub const COMMAND: &str = "order.get";

    #[derive(Deserialize)]
    pub struct Input {
        pub id: String,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["id"])
    }

    pub async fn handle(ctx: Context<OrderService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        let order = ctx.state().get_by_id(&input.id).await?;
        to_value(order)
    }
}

pub mod list_by_user {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    pub const COMMAND: &str = "order.list_by_user";

    #[derive(Deserialize)]
    pub struct Input {
        pub user_id: String,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["user_id"])
    }

    pub async fn handle(ctx: Context<OrderService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        let orders = ctx.state().list_by_user(&input.user_id).await?;
        Ok(json!({ "orders": to_value(orders)? }))
    }
}

pub mod list {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    pub const COMMAND: &str = "order.list";

    #[derive(Deserialize)]
    pub struct Input {
        #[serde(default)]
        pub limit: u64,
        #[serde(default)]
        pub skip: u64,
    }

    pub fn guard<S>(_ctx: &Context<S>) -> bool {
        true
    }

    pub async fn handle(ctx: Context<OrderService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        let orders = ctx.state().list_all(input.limit, input.skip).await?;
        Ok(json!({ "orders": to_value(orders)? }))
    }
}

pub mod patch_status {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::model::OrderStatus;

    pub const COMMAND: &str = "order.patch_status";

    #[derive(Deserialize)]
    pub struct Input {
        pub id: String,
        pub status: OrderStatus,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["id", "status"])
    }

    pub async fn handle(ctx: Context<OrderService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        ctx.state()
            .update_status(&input.id, input.status.clone())
            .await?;
        Ok(json!({ "id": input.id, "status": input.status }))
    }
}

pub mod update {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::model::OrderReplacement;

    pub const COMMAND: &str = "order.update";

    #[derive(Deserialize)]
    pub struct Input {
        pub id: String,
        #[serde(flatten)]
        pub order: OrderReplacement,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["id", "user_id", "item_ids", "total_price", "status"])
    }

    pub async fn handle(ctx: Context<OrderService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        ctx.state().full_update(&input.id, input.order).await?;
        Ok(json!({ "id": input.id }))
    }
}

pub mod delete {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    pub const COMMAND: &str = "order.delete";

    #[derive(Deserialize)]
    pub struct Input {
        pub id: String,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["id"])
    }

    pub async fn handle(ctx: Context<OrderService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        ctx.state().delete(&input.id).await?;
        Ok(json!({ "id": input.id }))
    }
}
