//! In-memory queue for testing and single-process scenarios.
//!
//! Records every published event in an append-only log that tests and
//! in-process consumers can inspect.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use async_trait::async_trait;

use super::{Event, PublishError, Publisher};

/// In-memory queue for testing and single-process scenarios.
///
/// Thread-safe; clones share the same log.
///
/// ## Example
///
/// ```ignore
/// use foodstore::bus::{Event, InMemoryQueue, Publisher};
///
/// let queue = InMemoryQueue::new();
/// queue.publish(Event::new("evt-1", "order.created", b"{}".to_vec())).await?;
/// assert_eq!(queue.topics(), vec!["order.created"]);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    log: Arc<RwLock<Vec<Event>>>,
}

impl InMemoryQueue {
    /// Create a new in-memory queue.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Event>> {
        self.log.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get all events in the log.
    pub fn events(&self) -> Vec<Event> {
        self.read().clone()
    }

    /// Get all topics in publish order.
    pub fn topics(&self) -> Vec<String> {
        self.read().iter().map(|e| e.topic.clone()).collect()
    }

    /// Get the total number of events in the log.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Find the first event on a topic.
    pub fn find_by_topic(&self, topic: &str) -> Option<Event> {
        self.read().iter().find(|e| e.topic == topic).cloned()
    }

    /// Find all events on a topic.
    pub fn find_all_by_topic(&self, topic: &str) -> Vec<Event> {
        self.read()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// Clear all events from the log.
    pub fn clear(&self) {
        self.log
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[async_trait]
impl Publisher for InMemoryQueue {
    async fn publish(&self, event: Event) -> Result<(), PublishError> {
        self.log
            .write()
            .map_err(|_| PublishError::Rejected("queue lock poisoned".into()))?
            .push(event);
        Ok(())
    }
}
