//! Context passed to command handlers.
//!
//! Carries the parsed input and a shared handle to the service state.
//! Handlers access everything they need through the context.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::HandlerError;

/// The context passed to every command handler.
///
/// Generic over `S`, the state the service was built with (for example a
/// `MenuService`). Owned, so handler futures can be `'static`.
///
/// ## Example
///
/// ```ignore
/// pub async fn handle(ctx: Context<MenuService>) -> Result<Value, HandlerError> {
///     let input = ctx.input::<Input>()?;
///     let item = ctx.state().get_by_id(&input.id).await?;
///     Ok(serde_json::to_value(item)?)
/// }
/// ```
pub struct Context<S> {
    /// The command name being handled.
    command_name: String,
    /// Raw JSON input from the request.
    input: Value,
    state: Arc<S>,
}

impl<S> Context<S> {
    pub(crate) fn new(command_name: String, input: Value, state: Arc<S>) -> Self {
        Self {
            command_name,
            input,
            state,
        }
    }

    /// Deserialize the input payload into a typed struct.
    pub fn input<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(self.input.clone())
            .map_err(|e| HandlerError::DecodeFailed(e.to_string()))
    }

    /// Get the raw JSON input.
    pub fn raw_input(&self) -> &Value {
        &self.input
    }

    /// Get the command name.
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Get the service state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Check if the raw input contains a field.
    pub fn has_field(&self, field: &str) -> bool {
        self.input.get(field).is_some()
    }

    /// Check if the raw input contains all specified fields.
    pub fn has_fields(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.has_field(f))
    }
}
