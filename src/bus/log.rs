use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::info;

use super::{Event, PublishError, Publisher};

/// A publisher that writes events to the log, or to a buffer when one is set.
///
/// Stands in for a broker client in single-process deployments.
#[derive(Clone, Default)]
pub struct LogPublisher {
    buffer: Option<Arc<Mutex<Vec<String>>>>,
}

impl LogPublisher {
    pub fn new() -> Self {
        LogPublisher { buffer: None }
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        LogPublisher {
            buffer: Some(buffer),
        }
    }
}

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, event: Event) -> Result<(), PublishError> {
        let payload = String::from_utf8_lossy(&event.payload);
        match &self.buffer {
            Some(buffer) => {
                let line = match &event.metadata {
                    Some(meta) => format!("[BUS] {} {} meta={:?}", event.topic, payload, meta),
                    None => format!("[BUS] {} {}", event.topic, payload),
                };
                buffer
                    .lock()
                    .map_err(|_| PublishError::Rejected("log publisher buffer poisoned".into()))?
                    .push(line);
            }
            None => {
                info!(topic = %event.topic, event_id = %event.id, payload = %payload, "published event");
            }
        }
        Ok(())
    }
}
