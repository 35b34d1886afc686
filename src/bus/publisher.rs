//! Core publisher contract for the event bus.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// An event to be published to the bus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Unique identifier for this event
    pub id: String,
    /// Subject the event is published on (e.g., "order.created")
    pub topic: String,
    /// Serialized payload
    pub payload: Vec<u8>,
    /// Optional metadata (headers, correlation IDs, etc.)
    pub metadata: Option<Vec<(String, String)>>,
}

impl Event {
    /// Create a new event with the given topic and payload.
    pub fn new(id: impl Into<String>, topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            payload,
            metadata: None,
        }
    }

    /// Create an event with a JSON payload.
    pub fn encode<T: Serialize>(
        id: impl Into<String>,
        topic: impl Into<String>,
        payload: &T,
    ) -> Result<Self, PublishError> {
        let bytes = serde_json::to_vec(payload)
            .map_err(|e| PublishError::SerializationFailed(e.to_string()))?;
        Ok(Self::new(id, topic, bytes))
    }

    /// Decode a JSON payload.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, PublishError> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| PublishError::SerializationFailed(e.to_string()))
    }

    /// Add metadata to the event.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Error type for publish operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Serialization of the event failed
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    /// The bus rejected the event
    #[error("event rejected: {0}")]
    Rejected(String),
}

/// Trait for publishing events to a message bus.
///
/// One attempt per call. Retries, buffering and acknowledgement handling
/// belong to the implementation, never to callers.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish a single event to the bus.
    async fn publish(&self, event: Event) -> Result<(), PublishError>;
}
