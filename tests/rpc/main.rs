//! Command dispatch and transport integration tests.

#[path = "../support/mod.rs"]
mod support;

mod dispatch;

#[cfg(feature = "http")]
mod transport_http;

#[cfg(feature = "grpc")]
mod transport_grpc;
