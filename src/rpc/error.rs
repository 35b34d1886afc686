//! Error types for RPC command handlers.

use thiserror::Error;

use crate::error::ServiceError;

/// Error type for command handler operations.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// No handler registered for this command name.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    /// Payload decode / deserialization failed.
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    /// Guard rejected the command (required input fields missing).
    #[error("guard rejected command: {0}")]
    GuardRejected(String),
    /// The domain rejected a well-formed value.
    #[error("rejected: {0}")]
    Rejected(String),
    /// Record not found, or its id is malformed.
    #[error("not found: {0}")]
    NotFound(String),
    /// Record store or catalog unreachable.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("handler error: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(what) => HandlerError::NotFound(what),
            ServiceError::Invalid(msg) => HandlerError::Rejected(msg),
            ServiceError::UpstreamUnavailable(msg) => HandlerError::Unavailable(msg),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::DecodeFailed(err.to_string())
    }
}

impl HandlerError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::UnknownCommand(_) => 404,
            HandlerError::DecodeFailed(_) => 400,
            HandlerError::GuardRejected(_) => 400,
            HandlerError::Rejected(_) => 422,
            HandlerError::NotFound(_) => 404,
            HandlerError::Unavailable(_) => 503,
            HandlerError::Other(_) => 500,
        }
    }
}
