//! Both services wired together in one process and driven through
//! `Service::dispatch`, the way every transport drives them.

use std::sync::Arc;

use foodstore::bus::InMemoryQueue;
use foodstore::cache::{InMemoryCacheBackend, ResultCache};
use foodstore::catalog::MenuCatalog;
use foodstore::rpc::{CommandRequest, HandlerError, Service};
use foodstore::store::RecordStore;
use foodstore::{menu, order, MenuService, OrderService};
use serde_json::{json, Value};

use crate::support::CountingStore;

struct Shop {
    menu: Service<MenuService>,
    orders: Service<OrderService>,
    queue: InMemoryQueue,
}

fn shop() -> Shop {
    let store: Arc<dyn RecordStore> = Arc::new(CountingStore::new());
    let menu_service = MenuService::new(store.clone(), ResultCache::new(InMemoryCacheBackend::new()));
    let queue = InMemoryQueue::new();
    let order_service = OrderService::new(
        store,
        ResultCache::new(InMemoryCacheBackend::new()),
        Arc::new(MenuCatalog::new(menu_service.clone())),
        Arc::new(queue.clone()),
    );
    Shop {
        menu: menu::handlers::service(menu_service),
        orders: order::handlers::service(order_service),
        queue,
    }
}

async fn create_item(shop: &Shop, name: &str, price: f64, category: &str) -> String {
    let created = shop
        .menu
        .dispatch(
            "menu.create",
            json!({ "name": name, "price": price, "category": category }),
        )
        .await
        .unwrap();
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn order_flow_end_to_end() {
    let shop = shop();
    let pizza = create_item(&shop, "Pizza", 9.99, "Main").await;
    let soda = create_item(&shop, "Soda", 2.01, "Drinks").await;

    let created = shop
        .orders
        .dispatch(
            "order.create",
            json!({ "user_id": "u1", "item_ids": [pizza, soda] }),
        )
        .await
        .unwrap();
    let order_id = created["id"].as_str().unwrap().to_string();

    let order = shop
        .orders
        .dispatch("order.get", json!({ "id": order_id }))
        .await
        .unwrap();
    assert_eq!(order["total_price"], json!(12.0));
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["user_id"], "u1");

    let patched = shop
        .orders
        .dispatch(
            "order.patch_status",
            json!({ "id": order_id, "status": "Completed" }),
        )
        .await
        .unwrap();
    assert_eq!(patched, json!({ "id": order_id, "status": "Completed" }));

    let listed = shop
        .orders
        .dispatch("order.list_by_user", json!({ "user_id": "u1" }))
        .await
        .unwrap();
    assert_eq!(listed["orders"][0]["status"], "Completed");
    assert_eq!(shop.queue.topics(), vec!["order.created"]);
}

#[tokio::test]
async fn menu_listing_through_dispatch() {
    let shop = shop();
    create_item(&shop, "Pizza", 9.99, "Main").await;
    create_item(&shop, "Burger", 8.5, "Main").await;
    create_item(&shop, "Gelato", 3.5, "Dessert").await;

    let page = shop
        .menu
        .dispatch(
            "menu.list",
            json!({ "category": "Main", "sort_by": "price", "limit": 10 }),
        )
        .await
        .unwrap();

    assert_eq!(page["total_count"], 2);
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Burger", "Pizza"]);

    let count = shop
        .menu
        .dispatch("menu.count", json!({ "search": "GEL" }))
        .await
        .unwrap();
    assert_eq!(count, json!({ "count": 1 }));
}

#[tokio::test]
async fn full_order_update_through_dispatch() {
    let shop = shop();
    let pizza = create_item(&shop, "Pizza", 9.99, "Main").await;
    let created = shop
        .orders
        .dispatch("order.create", json!({ "user_id": "u1", "item_ids": [pizza] }))
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    shop.orders
        .dispatch(
            "order.update",
            json!({
                "id": id,
                "user_id": "u1",
                "item_ids": [],
                "total_price": 0,
                "status": "Cancelled",
            }),
        )
        .await
        .unwrap();

    let order = shop
        .orders
        .dispatch("order.get", json!({ "id": id }))
        .await
        .unwrap();
    assert_eq!(order["status"], "Cancelled");
    assert_eq!(order["item_ids"], json!([]));

    let all = shop.orders.dispatch("order.list", json!({})).await.unwrap();
    assert_eq!(all["orders"].as_array().unwrap().len(), 1);

    shop.orders
        .dispatch("order.delete", json!({ "id": id }))
        .await
        .unwrap();
    let all = shop.orders.dispatch("order.list", json!({})).await.unwrap();
    assert_eq!(all["orders"], json!([]));
}

#[tokio::test]
async fn failures_map_to_status_codes() {
    let shop = shop();

    let cases: Vec<(&Service<OrderService>, &str, Value, u16)> = vec![
        (&shop.orders, "order.refund", json!({}), 404),
        (&shop.orders, "order.create", json!({ "user_id": "u1" }), 400),
        (&shop.orders, "order.get", json!({ "id": "nope" }), 404),
        (
            &shop.orders,
            "order.patch_status",
            json!({ "id": "65f1c0ffee65f1c0ffee65f1", "status": "" }),
            422,
        ),
        (&shop.orders, "order.list", json!({ "limit": "ten" }), 400),
    ];

    for (service, command, input, status) in cases {
        let response = service
            .dispatch_request(CommandRequest {
                command: command.to_string(),
                input,
            })
            .await;
        assert_eq!(response.status, status, "{}", command);
        assert!(!response.is_success());
        assert!(response.body["error"].is_string());
    }
}

#[tokio::test]
async fn unknown_menu_item_is_not_found() {
    let shop = shop();
    let err = shop
        .menu
        .dispatch("menu.get", json!({ "id": "65f1c0ffee65f1c0ffee65f1" }))
        .await
        .unwrap_err();
    assert!(matches!(err, HandlerError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn created_items_are_available_unless_told_otherwise() {
    let shop = shop();
    let id = create_item(&shop, "Soup", 4.5, "Starter").await;

    let item = shop
        .menu
        .dispatch("menu.get", json!({ "id": id }))
        .await
        .unwrap();
    assert_eq!(item["available"], true);
}
