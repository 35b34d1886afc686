//! Event bus - publishing abstractions
//!
//! Services hand domain events to a [`Publisher`] and never learn which
//! broker sits behind it.
//!
//! ```text
//! ┌──────────────┐   publish(event)   ┌─────────────────────────────┐
//! │ OrderService │ ─────────────────▶ │ Publisher                   │
//! └──────────────┘                    │  InMemoryQueue (tests)      │
//!                                     │  LogPublisher  (single node)│
//!                                     │  broker client (external)   │
//!                                     └─────────────────────────────┘
//! ```
//!
//! Delivery is at-most-once per call: a publisher makes a single attempt
//! and reports the outcome. Callers decide whether a failure matters.

mod in_memory_queue;
mod log;
mod publisher;

pub use in_memory_queue::InMemoryQueue;
pub use log::LogPublisher;
pub use publisher::{Event, PublishError, Publisher};
