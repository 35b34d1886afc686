//! Service configuration sourced from environment variables.
//!
//! A `.env` file in the working directory is loaded first when present;
//! variables already set in the environment win.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::order::DEFAULT_TOPIC;

const DEFAULT_MENU_BIND: &str = "0.0.0.0:50051";
const DEFAULT_ORDER_BIND: &str = "0.0.0.0:50053";
const DEFAULT_MENU_ENDPOINT: &str = "http://127.0.0.1:50051";
const DEFAULT_CACHE_TTL_SECS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // gRPC listener for the menu service.
    pub menu_bind: SocketAddr,
    // gRPC listener for the order service.
    pub order_bind: SocketAddr,
    // Where the order service reaches the menu service.
    pub menu_endpoint: String,
    // Optional HTTP listener, served next to gRPC.
    pub http_bind: Option<String>,
    // Redis URL; without one the cache is in-process.
    pub redis_url: Option<String>,
    pub cache_ttl: Duration,
    // Subject order-created events are published on.
    pub order_topic: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine.
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset and blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let menu_bind = var("FOODSTORE_MENU_BIND")
            .unwrap_or_else(|| DEFAULT_MENU_BIND.to_string())
            .parse()
            .with_context(|| "parse FOODSTORE_MENU_BIND")?;
        let order_bind = var("FOODSTORE_ORDER_BIND")
            .unwrap_or_else(|| DEFAULT_ORDER_BIND.to_string())
            .parse()
            .with_context(|| "parse FOODSTORE_ORDER_BIND")?;
        let menu_endpoint =
            var("FOODSTORE_MENU_ENDPOINT").unwrap_or_else(|| DEFAULT_MENU_ENDPOINT.to_string());
        let http_bind = var("FOODSTORE_HTTP_BIND");
        let redis_url = var("FOODSTORE_REDIS_URL");
        let cache_ttl_secs = match var("FOODSTORE_CACHE_TTL_SECS") {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| "parse FOODSTORE_CACHE_TTL_SECS")?,
            None => DEFAULT_CACHE_TTL_SECS,
        };
        let order_topic = var("FOODSTORE_ORDER_TOPIC").unwrap_or_else(|| DEFAULT_TOPIC.to_string());

        Ok(Self {
            menu_bind,
            order_bind,
            menu_endpoint,
            http_bind,
            redis_url,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            order_topic,
        })
    }
}
