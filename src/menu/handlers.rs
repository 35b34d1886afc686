//! RPC handlers for the menu service, one module per command.

use serde_json::Value;

use super::MenuService;
use crate::rpc::{Context, HandlerError, Service};

/// Build the menu command service.
pub fn service(menu: MenuService) -> Service<MenuService> {
    crate::register_handlers!(
        Service::new(menu),
        list,
        get,
        get_multiple,
        create,
        update,
        delete,
        count,
    )
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(|e| HandlerError::Other(Box::new(e)))
}

pub mod list {
    use serde::Deserialize;

    use super::*;
    use crate::menu::{MenuFilter, MenuQuery};
    use crate::store::Sort;

    pub const COMMAND: &str = "menu.list";

    #[derive(Deserialize)]
    pub struct Input {
        #[serde(default)]
        pub category: Option<String>,
        #[serde(default)]
        pub search: Option<String>,
        #[serde(default)]
        pub sort_by: Option<String>,
        #[serde(default = "ascending")]
        pub ascending: bool,
        #[serde(default)]
        pub limit: u64,
        #[serde(default)]
        pub skip: u64,
    }

    fn ascending() -> bool {
        true
    }

    pub fn guard<S>(_ctx: &Context<S>) -> bool {
        true
    }

    pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        let query = MenuQuery {
            filter: MenuFilter {
                category: input.category,
                search: input.search,
            },
            sort: input
                .sort_by
                .filter(|field| !field.is_empty())
                .map(|field| Sort {
                    field,
                    ascending: input.ascending,
                }),
            limit: input.limit,
            skip: input.skip,
        };
        let page = ctx.state().list(&query).await?;
        to_value(page)
    }
}

pub mod get {
    use serde::Deserialize;

    use super::*;

    pub const COMMAND: &str = "menu.get";

    #[derive(Deserialize)]
    pub struct Input {
        pub id: String,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["id"])
    }

    pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        let item = ctx.state().get_by_id(&input.id).await?;
        to_value(item)
    }
}

pub mod get_multiple {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    pub const COMMAND: &str = "menu.get_multiple";

    #[derive(Deserialize)]
    pub struct Input {
        pub ids: Vec<String>,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["ids"])
    }

    pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        let items = ctx.state().get_multiple(&input.ids).await?;
        Ok(json!({ "items": to_value(items)? }))
    }
}

pub mod create {
    use serde_json::json;

    use super::*;
    use crate::model::MenuItem;

    pub const COMMAND: &str = "menu.create";

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["name", "price"])
    }

    pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
        let item = ctx.input::<MenuItem>()?;
        let id = ctx.state().create(item).await?;
        Ok(json!({ "id": id }))
    }
}

pub mod update {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::model::MenuItemPatch;

    pub const COMMAND: &str = "menu.update";

    #[derive(Deserialize)]
    pub struct Input {
        pub id: String,
        #[serde(flatten)]
        pub patch: MenuItemPatch,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["id"])
    }

    pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        ctx.state().update(&input.id, input.patch).await?;
        Ok(json!({ "id": input.id }))
    }
}

pub mod delete {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    pub const COMMAND: &str = "menu.delete";

    #[derive(Deserialize)]
    pub struct Input {
        pub id: String,
    }

    pub fn guard<S>(ctx: &Context<S>) -> bool {
        ctx.has_fields(&["id"])
    }

    pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
        let input = ctx.input::<Input>()?;
        ctx.state().delete(&input.id).await?;
        Ok(json!({ "id": input.id }))
    }
}

pub mod count {
    use serde_json::json;

    use super::*;
    use crate::menu::MenuFilter;

    pub const COMMAND: &str = "menu.count";

    pub fn guard<S>(_ctx: &Context<S>) -> bool {
        true
    }

    pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
        let filter = ctx.input::<MenuFilter>()?;
        let count = ctx.state().count(&filter).await?;
        Ok(json!({ "count": count }))
    }
}
