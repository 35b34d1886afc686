//! Service - command handler registry and dispatch.
//!
//! `Service<S>` holds shared state and a set of named async command
//! handlers. Each handler receives a `Context<S>` and resolves to
//! `Result<Value, HandlerError>`.
//!
//! ## Example
//!
//! ```ignore
//! use foodstore::rpc::Service;
//! use serde_json::json;
//!
//! let service = Service::new(menu)
//!     .command("menu.count", |ctx| async move {
//!         let count = ctx.state().count(&ctx.input()?).await?;
//!         Ok(json!({ "count": count }))
//!     });
//!
//! let result = service.dispatch("menu.count", json!({})).await;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use super::context::Context;
use super::error::HandlerError;

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, HandlerError>> + Send>>;
type HandleFn<S> = Box<dyn Fn(Context<S>) -> HandlerFuture + Send + Sync>;
type GuardFn<S> = Box<dyn Fn(&Context<S>) -> bool + Send + Sync>;

/// A registered command handler with optional guard.
struct CommandHandler<S> {
    guard: Option<GuardFn<S>>,
    handle: HandleFn<S>,
}

/// A microservice that routes commands to async handler functions.
pub struct Service<S> {
    state: Arc<S>,
    handlers: HashMap<String, CommandHandler<S>>,
}

impl<S: Send + Sync + 'static> Service<S> {
    /// Create a new service around the given state.
    pub fn new(state: S) -> Self {
        Self::from_shared(Arc::new(state))
    }

    pub fn from_shared(state: Arc<S>) -> Self {
        Self {
            state,
            handlers: HashMap::new(),
        }
    }

    /// Register a command handler.
    ///
    /// Builder style; returns `self` for chaining.
    pub fn command<F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(Context<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.handlers.insert(
            name.to_string(),
            CommandHandler {
                guard: None,
                handle: Box::new(move |ctx| Box::pin(handler(ctx))),
            },
        );
        self
    }

    /// Register a command handler with a guard function.
    ///
    /// The guard is called before the handler. If it returns `false`,
    /// the command is rejected with `HandlerError::GuardRejected`.
    pub fn command_guarded<G, F, Fut>(mut self, name: &str, guard: G, handler: F) -> Self
    where
        G: Fn(&Context<S>) -> bool + Send + Sync + 'static,
        F: Fn(Context<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.handlers.insert(
            name.to_string(),
            CommandHandler {
                guard: Some(Box::new(guard)),
                handle: Box::new(move |ctx| Box::pin(handler(ctx))),
            },
        );
        self
    }

    /// Dispatch a command by name.
    ///
    /// Builds a `Context` from the input, looks up the handler, runs the
    /// guard (if any), then awaits the handler.
    pub async fn dispatch(&self, command: &str, input: Value) -> Result<Value, HandlerError> {
        let handler = self
            .handlers
            .get(command)
            .ok_or_else(|| HandlerError::UnknownCommand(command.to_string()))?;

        let ctx = Context::new(command.to_string(), input, Arc::clone(&self.state));

        if let Some(guard) = &handler.guard {
            if !guard(&ctx) {
                return Err(HandlerError::GuardRejected(command.to_string()));
            }
        }

        (handler.handle)(ctx).await
    }

    /// Dispatch a `CommandRequest`, returning a `CommandResponse`.
    pub async fn dispatch_request(&self, request: CommandRequest) -> CommandResponse {
        match self.dispatch(&request.command, request.input).await {
            Ok(value) => CommandResponse::ok(value),
            Err(e) => CommandResponse::error(&e),
        }
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut commands: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        commands.sort_unstable();
        commands
    }

    /// Get a reference to the service state.
    pub fn state(&self) -> &S {
        &self.state
    }
}

/// Transport-neutral command request.
///
/// ```json
/// { "command": "order.create", "input": { "user_id": "u1", "item_ids": ["..."] } }
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CommandRequest {
    /// Command name (from the URL path or the gRPC request).
    pub command: String,
    /// JSON input payload.
    #[serde(default)]
    pub input: Value,
}

/// Response from dispatching a command.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CommandResponse {
    /// HTTP-style status code.
    pub status: u16,
    /// Response body (handler result or `{ "error": ... }`).
    pub body: Value,
}

impl CommandResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(err: &HandlerError) -> Self {
        Self {
            status: err.status_code(),
            body: serde_json::json!({ "error": err.to_string() }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
