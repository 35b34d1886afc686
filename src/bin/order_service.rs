use std::sync::Arc;

use anyhow::Context;
use foodstore::bus::LogPublisher;
use foodstore::catalog::GrpcCatalog;
use foodstore::config::Config;
use foodstore::store::{InMemoryRecordStore, RecordStore};
use foodstore::{bootstrap, observability, order, OrderService};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_tracing();
    let config = Config::from_env()?;

    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
    let cache = bootstrap::result_cache(&config).await;
    let catalog = GrpcCatalog::connect_lazy(&config.menu_endpoint)
        .with_context(|| format!("menu endpoint {}", config.menu_endpoint))?;

    let orders = OrderService::new(store, cache, Arc::new(catalog), Arc::new(LogPublisher::new()))
        .with_topic(config.order_topic.clone());
    let service = Arc::new(order::handlers::service(orders));

    info!(bind = %config.order_bind, menu = %config.menu_endpoint, "starting order service");
    bootstrap::serve(service, config.order_bind, config.http_bind.as_deref()).await
}
