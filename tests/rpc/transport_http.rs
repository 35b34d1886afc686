//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use foodstore::menu::handlers;
use foodstore::rpc::{self, Service};
use foodstore::MenuService;
use serde_json::{json, Value};

use crate::support::MenuFixture;

/// Bind to port 0 and return the actual address.
async fn start_server(service: Arc<Service<MenuService>>) -> String {
    let app = rpc::router(service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn menu_service() -> Arc<Service<MenuService>> {
    Arc::new(handlers::service(MenuFixture::new().menu))
}

#[tokio::test]
async fn health_check() {
    let base = start_server(menu_service()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);
    let commands = body["commands"].as_array().unwrap();
    assert!(commands.iter().any(|c| c == "menu.list"));
    assert!(commands.iter().any(|c| c == "menu.get_multiple"));
}

#[tokio::test]
async fn create_then_list() {
    let base = start_server(menu_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/menu.create"))
        .json(&json!({ "name": "Pizza", "price": 9.99, "category": "Main" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let page: Value = client
        .post(format!("{base}/menu.list"))
        .json(&json!({ "category": "Main", "limit": 10 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total_count"], 1);
    assert_eq!(page["items"][0]["id"], id.as_str());
    assert_eq!(page["items"][0]["price"], json!(9.99));
}

#[tokio::test]
async fn errors_carry_status_codes() {
    let base = start_server(menu_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/menu.unknown"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = client
        .post(format!("{base}/menu.get"))
        .json(&json!({ "id": "65f1c0ffee65f1c0ffee65f1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("65f1c0ffee65f1c0ffee65f1"));

    let resp = client
        .post(format!("{base}/menu.create"))
        .json(&json!({ "name": "Refund", "price": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
}
