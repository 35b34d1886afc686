//! Process wiring shared by the service binaries.

use tokio::signal;
use tracing::{info, warn};

use crate::cache::ResultCache;
use crate::config::Config;

/// Build the result cache the config asks for.
///
/// With a Redis URL (and the `redis` feature) the cache is Redis-backed. If
/// Redis cannot be reached at startup the service runs with the cache
/// disabled rather than refusing to start.
pub async fn result_cache(config: &Config) -> ResultCache {
    match config.redis_url.as_deref() {
        #[cfg(feature = "redis")]
        Some(url) => match crate::cache::RedisCacheBackend::connect(url).await {
            Ok(backend) => ResultCache::new(backend).with_ttl(config.cache_ttl),
            Err(e) => {
                warn!(error = %e, "redis unavailable, running without a result cache");
                ResultCache::disabled()
            }
        },
        #[cfg(not(feature = "redis"))]
        Some(_) => {
            warn!("FOODSTORE_REDIS_URL is set but the redis feature is disabled; using the in-process cache");
            ResultCache::default().with_ttl(config.cache_ttl)
        }
        None => ResultCache::default().with_ttl(config.cache_ttl),
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "could not install Ctrl+C handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "could not install SIGTERM handler");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Serve a command service over gRPC, and over HTTP too when `http_bind`
/// is set, until a shutdown signal arrives.
#[cfg(feature = "grpc")]
pub async fn serve<S: Send + Sync + 'static>(
    service: std::sync::Arc<crate::rpc::Service<S>>,
    grpc_bind: std::net::SocketAddr,
    http_bind: Option<&str>,
) -> anyhow::Result<()> {
    use anyhow::Context;
    use tokio::sync::watch;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let http = spawn_http(service.clone(), http_bind, stop_rx.clone());

    crate::rpc::grpc::serve_grpc_with_shutdown(service, grpc_bind, stopped(stop_rx))
        .await
        .context("grpc transport")?;

    if let Some(handle) = http {
        handle
            .await
            .context("http transport task")?
            .context("http transport")?;
    }

    info!("stopped");
    Ok(())
}

#[cfg(feature = "grpc")]
type HttpTask = tokio::task::JoinHandle<std::io::Result<()>>;

#[cfg(feature = "grpc")]
async fn stopped(mut rx: tokio::sync::watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

#[cfg(all(feature = "grpc", feature = "http"))]
fn spawn_http<S: Send + Sync + 'static>(
    service: std::sync::Arc<crate::rpc::Service<S>>,
    http_bind: Option<&str>,
    stop: tokio::sync::watch::Receiver<bool>,
) -> Option<HttpTask> {
    let addr = http_bind?.to_string();
    Some(tokio::spawn(async move {
        crate::rpc::serve_with_shutdown(service, &addr, stopped(stop)).await
    }))
}

#[cfg(all(feature = "grpc", not(feature = "http")))]
fn spawn_http<S: Send + Sync + 'static>(
    _service: std::sync::Arc<crate::rpc::Service<S>>,
    http_bind: Option<&str>,
    _stop: tokio::sync::watch::Receiver<bool>,
) -> Option<HttpTask> {
    if http_bind.is_some() {
        warn!("FOODSTORE_HTTP_BIND is set but the http feature is disabled; serving gRPC only");
    }
    None
}
