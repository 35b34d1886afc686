//! Catalog lookup over a remote menu service's gRPC command endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tonic::transport::{Channel, Endpoint};
use tracing::debug;

use super::{CatalogEntry, CatalogLookup};
use crate::error::{ServiceError, ServiceResult};
use crate::model::MenuItem;
use crate::rpc::grpc::{CommandServiceClient, GrpcRequest};

const GET_MULTIPLE: &str = "menu.get_multiple";

#[derive(Deserialize)]
struct Items {
    items: Vec<MenuItem>,
}

/// Resolves prices by dispatching `menu.get_multiple` to a menu service.
///
/// The channel connects lazily and reconnects on its own, so the order
/// service can start before the menu service is reachable.
#[derive(Clone)]
pub struct GrpcCatalog {
    client: CommandServiceClient<Channel>,
}

impl GrpcCatalog {
    /// Build a client for `endpoint` (e.g. `"http://127.0.0.1:50051"`).
    pub fn connect_lazy(endpoint: &str) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint.to_string())?.connect_lazy();
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: CommandServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl CatalogLookup for GrpcCatalog {
    async fn resolve(&self, ids: &[String]) -> ServiceResult<Vec<CatalogEntry>> {
        let request = GrpcRequest {
            command: GET_MULTIPLE.to_string(),
            input: json!({ "ids": ids }).to_string(),
        };

        let mut client = self.client.clone();
        let response = client
            .dispatch(request)
            .await
            .map_err(|status| ServiceError::UpstreamUnavailable(format!("menu service: {}", status)))?
            .into_inner();

        if response.status != 200 {
            return Err(ServiceError::UpstreamUnavailable(format!(
                "menu service answered {}: {}",
                response.status, response.body
            )));
        }

        let Items { items } = serde_json::from_str(&response.body).map_err(|e| {
            ServiceError::UpstreamUnavailable(format!("menu service sent an unreadable body: {}", e))
        })?;
        debug!(requested = ids.len(), resolved = items.len(), "catalog resolved");
        Ok(items.into_iter().map(CatalogEntry::from).collect())
    }
}
