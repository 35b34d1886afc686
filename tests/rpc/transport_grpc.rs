//! gRPC transport integration tests.
//!
//! Starts a tonic gRPC server and exercises it with the generated client,
//! then points an order service's catalog at it.

use std::sync::Arc;

use foodstore::catalog::{CatalogLookup, GrpcCatalog};
use foodstore::menu::handlers;
use foodstore::rpc::grpc::{CommandServiceClient, GrpcRequest, HealthRequest};
use foodstore::rpc::Service;
use foodstore::{MenuItem, MenuService, ServiceError};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Channel;

use crate::support::{ids, MenuFixture, OrderFixture};

/// Bind to port 0, spawn the gRPC server, and return its endpoint.
async fn start_server(service: Arc<Service<MenuService>>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let grpc_svc = foodstore::rpc::grpc::grpc_server(service);
    tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(grpc_svc)
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

async fn client(endpoint: String) -> CommandServiceClient<Channel> {
    CommandServiceClient::connect(endpoint).await.unwrap()
}

#[tokio::test]
async fn health_check() {
    let fixture = MenuFixture::new();
    let endpoint = start_server(Arc::new(handlers::service(fixture.menu))).await;
    let mut client = client(endpoint).await;

    let resp = client
        .health(HealthRequest {})
        .await
        .unwrap()
        .into_inner();

    assert!(resp.ok);
    assert!(resp.commands.iter().any(|c| c == "menu.create"));
    assert!(resp.commands.iter().any(|c| c == "menu.get_multiple"));
}

#[tokio::test]
async fn dispatch_create_and_get() {
    let fixture = MenuFixture::new();
    let endpoint = start_server(Arc::new(handlers::service(fixture.menu))).await;
    let mut client = client(endpoint).await;

    let resp = client
        .dispatch(GrpcRequest {
            command: "menu.create".into(),
            input: json!({ "name": "Pizza", "price": 9.99, "category": "Main" }).to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resp.status, 200);
    let created: Value = serde_json::from_str(&resp.body).unwrap();

    let resp = client
        .dispatch(GrpcRequest {
            command: "menu.get".into(),
            input: json!({ "id": created["id"] }).to_string(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resp.status, 200);
    let item: MenuItem = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(item.name, "Pizza");
    assert_eq!(item.price, dec!(9.99));
}

#[tokio::test]
async fn dispatch_reports_errors_in_the_response() {
    let fixture = MenuFixture::new();
    let endpoint = start_server(Arc::new(handlers::service(fixture.menu))).await;
    let mut client = client(endpoint).await;

    let resp = client
        .dispatch(GrpcRequest {
            command: "menu.nope".into(),
            input: String::new(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resp.status, 404);

    let resp = client
        .dispatch(GrpcRequest {
            command: "menu.get".into(),
            input: "{not json".into(),
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(resp.status, 400);
    let body: Value = serde_json::from_str(&resp.body).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn grpc_catalog_prices_orders_from_a_remote_menu() {
    let menu = MenuFixture::new();
    let pizza = menu
        .menu
        .create(MenuItem::new("Pizza", dec!(9.99), "Main"))
        .await
        .unwrap();
    let soda = menu
        .menu
        .create(MenuItem::new("Soda", dec!(1.50), "Drinks"))
        .await
        .unwrap();
    let endpoint = start_server(Arc::new(handlers::service(menu.menu.clone()))).await;

    let catalog = GrpcCatalog::connect_lazy(&endpoint).unwrap();
    let entries = catalog
        .resolve(&[pizza.to_string(), "unknown".to_string()])
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].unit_price, dec!(9.99));

    let orders = OrderFixture::new(catalog);
    let id = orders
        .orders
        .create_order("u1", ids(&[pizza.as_str(), soda.as_str(), soda.as_str()]))
        .await
        .unwrap();
    let order = orders.orders.get_by_id(id.as_str()).await.unwrap();
    assert_eq!(order.total_price, dec!(12.99));
    assert_eq!(orders.queue.len(), 1);
}

#[tokio::test]
async fn unreachable_menu_service_fails_order_creation() {
    // Nothing listens on port 1.
    let catalog = GrpcCatalog::connect_lazy("http://127.0.0.1:1").unwrap();
    let orders = OrderFixture::new(catalog);

    let result = orders.orders.create_order("u1", ids(&["a"])).await;

    assert!(matches!(result, Err(ServiceError::UpstreamUnavailable(_))));
    assert_eq!(orders.store.len("orders"), 0);
    assert!(orders.queue.is_empty());
}
