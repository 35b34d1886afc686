use std::sync::Arc;

use foodstore::config::Config;
use foodstore::store::{InMemoryRecordStore, RecordStore};
use foodstore::{bootstrap, menu, observability, MenuService};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init_tracing();
    let config = Config::from_env()?;

    let store: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
    let cache = bootstrap::result_cache(&config).await;
    let service = Arc::new(menu::handlers::service(MenuService::new(store, cache)));

    info!(bind = %config.menu_bind, "starting menu service");
    bootstrap::serve(service, config.menu_bind, config.http_bind.as_deref()).await
}
