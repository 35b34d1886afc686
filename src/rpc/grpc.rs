//! gRPC transport - maps gRPC requests to command dispatch.
//!
//! Requires the `grpc` feature. Uses tonic for the server and client and
//! prost for message serialization (standard protobuf wire format, no
//! `.proto` file).
//!
//! ## RPCs
//!
//! - `Dispatch` dispatches a command. Input = `GrpcRequest`, output = `GrpcResponse`.
//! - `Health` reports the commands the service answers.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use foodstore::{menu, rpc};
//!
//! let service = Arc::new(menu::handlers::service(menu_service));
//!
//! // Get the server to compose with other tonic routes
//! let grpc_svc = rpc::grpc::grpc_server(service.clone());
//!
//! // Or serve directly
//! rpc::grpc::serve_grpc(service, "0.0.0.0:50051".parse()?).await?;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tonic::{Request, Response, Status};
use tracing::info;

use super::error::HandlerError;
use super::service::Service;

// ---------------------------------------------------------------------------
// Message types (prost, standard protobuf wire format)
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message)]
pub struct GrpcRequest {
    #[prost(string, tag = "1")]
    pub command: String,
    #[prost(string, tag = "2")]
    pub input: String, // JSON string
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GrpcResponse {
    #[prost(uint32, tag = "1")]
    pub status: u32,
    #[prost(string, tag = "2")]
    pub body: String, // JSON string
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthResponse {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(string, repeated, tag = "2")]
    pub commands: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generated service trait + server/client
// ---------------------------------------------------------------------------

include!(concat!(env!("OUT_DIR"), "/foodstore.rpc.CommandService.rs"));

pub use command_service_client::CommandServiceClient;
pub use command_service_server::{CommandService, CommandServiceServer};

// ---------------------------------------------------------------------------
// Handler implementation
// ---------------------------------------------------------------------------

/// gRPC handler that wraps a `Service<S>` and implements the generated
/// `CommandService` trait. Mirrors the HTTP transport.
pub struct GrpcHandler<S> {
    service: Arc<Service<S>>,
}

impl<S> GrpcHandler<S> {
    pub fn new(service: Arc<Service<S>>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl<S: Send + Sync + 'static> CommandService for GrpcHandler<S> {
    async fn dispatch(
        &self,
        request: Request<GrpcRequest>,
    ) -> Result<Response<GrpcResponse>, Status> {
        let req = request.into_inner();

        let result = match parse_input(&req.input) {
            Ok(input) => self.service.dispatch(&req.command, input).await,
            Err(e) => Err(e),
        };

        let response = match result {
            Ok(value) => GrpcResponse {
                status: 200,
                body: value.to_string(),
            },
            Err(e) => GrpcResponse {
                status: u32::from(e.status_code()),
                body: json!({ "error": e.to_string() }).to_string(),
            },
        };
        Ok(Response::new(response))
    }

    async fn health(
        &self,
        _request: Request<HealthRequest>,
    ) -> Result<Response<HealthResponse>, Status> {
        let commands: Vec<String> = self
            .service
            .commands()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        Ok(Response::new(HealthResponse { ok: true, commands }))
    }
}

/// An empty input string stands for an empty object.
fn parse_input(raw: &str) -> Result<Value, HandlerError> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    Ok(serde_json::from_str(raw)?)
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Create a `CommandServiceServer` from a shared `Service<S>`.
pub fn grpc_server<S: Send + Sync + 'static>(
    service: Arc<Service<S>>,
) -> CommandServiceServer<GrpcHandler<S>> {
    CommandServiceServer::new(GrpcHandler::new(service))
}

/// Bind and serve the gRPC transport at the given address.
pub async fn serve_grpc<S: Send + Sync + 'static>(
    service: Arc<Service<S>>,
    addr: SocketAddr,
) -> Result<(), tonic::transport::Error> {
    serve_grpc_with_shutdown(service, addr, std::future::pending()).await
}

/// Serve until `signal` resolves, then stop accepting and drain.
pub async fn serve_grpc_with_shutdown<S, F>(
    service: Arc<Service<S>>,
    addr: SocketAddr,
    signal: F,
) -> Result<(), tonic::transport::Error>
where
    S: Send + Sync + 'static,
    F: Future<Output = ()>,
{
    info!(%addr, "grpc transport listening");
    tonic::transport::Server::builder()
        .add_service(grpc_server(service))
        .serve_with_shutdown(addr, signal)
        .await
}
