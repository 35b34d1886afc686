use thiserror::Error;

use crate::store::StoreError;

/// Failures surfaced by the menu and order services.
///
/// Cache and publish failures never appear here: both are absorbed and
/// logged by the layer that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The id is malformed or has no record behind it.
    #[error("not found: {0}")]
    NotFound(String),
    /// The record store or catalog could not be reached or answered garbage.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The request was well-formed but carries a value the domain rejects.
    #[error("invalid input: {0}")]
    Invalid(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => {
                ServiceError::NotFound(format!("{}:{}", collection, id))
            }
            other => ServiceError::UpstreamUnavailable(other.to_string()),
        }
    }
}
