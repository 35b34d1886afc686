//! rpc - Convention-based command dispatch for the menu and order services.
//!
//! Each service registers named async command handlers on a `Service`.
//! A handler receives a `Context<S>` with the JSON input and the service
//! state, and answers with a JSON value or a `HandlerError` that carries an
//! HTTP-style status code. Transports (HTTP, gRPC) only move
//! `{command, input}` in and `{status, body}` out.
//!
//! ## Handler Convention
//!
//! Each handler module follows this convention:
//!
//! ```ignore
//! pub mod get {
//!     pub const COMMAND: &str = "menu.get";
//!
//!     pub fn guard<S>(ctx: &Context<S>) -> bool {
//!         ctx.has_fields(&["id"])
//!     }
//!
//!     pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
//!         let input = ctx.input::<Input>()?;
//!         let item = ctx.state().get_by_id(&input.id).await?;
//!         Ok(serde_json::to_value(item)?)
//!     }
//! }
//! ```

mod context;
mod error;
mod service;

pub use context::Context;
pub use error::HandlerError;
pub use service::{CommandRequest, CommandResponse, Service};

// HTTP transport (requires "http" feature)
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve, serve_with_shutdown};

// gRPC transport (requires "grpc" feature)
#[cfg(feature = "grpc")]
pub mod grpc;

/// Register handler modules with a service using the convention pattern.
///
/// Each handler module must export:
/// - `COMMAND: &str`, the command name
/// - `guard(ctx) -> bool`, input validation
/// - `async handle(ctx) -> Result<Value, HandlerError>`, the handler
///
/// # Example
/// ```ignore
/// let service = foodstore::register_handlers!(
///     rpc::Service::new(menu_service),
///     handlers::get,
///     handlers::list,
/// );
/// ```
#[macro_export]
macro_rules! register_handlers {
    ($service:expr, $( $($seg:ident)::+ ),+ $(,)?) => {
        $service
        $(
            .command_guarded(
                $($seg)::+::COMMAND,
                $($seg)::+::guard,
                $($seg)::+::handle,
            )
        )+
    };
}
