//! HTTP transport - maps HTTP requests to command dispatch.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /:command` dispatches a command. Body = JSON input.
//! - `GET /health` returns `{ "ok": true, "commands": [...] }`.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use foodstore::{menu, rpc};
//!
//! let service = Arc::new(menu::handlers::service(menu_service));
//!
//! // Get the router to compose with other axum routes
//! let app = rpc::router(service.clone());
//!
//! // Or serve directly
//! rpc::serve(service, "0.0.0.0:8080").await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::info;

use super::service::Service;

/// Build an axum `Router` that dispatches commands via the given service.
pub fn router<S: Send + Sync + 'static>(service: Arc<Service<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/:command", post(command_handler))
        .with_state(service)
}

/// Serve the service over HTTP at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve<S: Send + Sync + 'static>(
    service: Arc<Service<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    serve_with_shutdown(service, addr, std::future::pending()).await
}

/// Serve until `signal` resolves, then drain in-flight requests.
pub async fn serve_with_shutdown<S, F>(
    service: Arc<Service<S>>,
    addr: &str,
    signal: F,
) -> Result<(), std::io::Error>
where
    S: Send + Sync + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "http transport listening");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(signal)
        .await
}

/// `GET /health` returns `{ "ok": true, "commands": [...] }`.
async fn health_handler<S: Send + Sync + 'static>(
    State(service): State<Arc<Service<S>>>,
) -> impl IntoResponse {
    let commands: Vec<&str> = service.commands();
    Json(json!({ "ok": true, "commands": commands }))
}

/// `POST /:command` dispatches a command with the JSON body as input.
async fn command_handler<S: Send + Sync + 'static>(
    State(service): State<Arc<Service<S>>>,
    Path(command): Path<String>,
    Json(input): Json<Value>,
) -> impl IntoResponse {
    match service.dispatch(&command, input).await {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({ "error": e.to_string() });
            (status, Json(body)).into_response()
        }
    }
}
