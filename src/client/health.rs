// file: src/client/health.rs
// description: liveness probe for the embedding service
// reference: GET /health contract of the embedding service

use crate::client::endpoint::Endpoint;
use crate::client::transport::Transport;
use crate::error::Result;
use crate::utils::telemetry::HealthCheck;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const COMPONENT: &str = "embedding-service";

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

pub struct HealthProbe {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
}

impl HealthProbe {
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub async fn status(&self) -> Result<String> {
        let url = self.endpoint.url_for("/health");
        let response: HealthResponse = self.transport.get(&url).await?.into_json(&url)?;
        Ok(response.status)
    }

    /// Never fails: problems are reported inside the returned check.
    pub async fn check(&self) -> HealthCheck {
        let start = Instant::now();
        let endpoint = self.endpoint.as_str();
        let result = self.status().await;
        let elapsed = start.elapsed();
        debug!("Health probe of {} took {:?}", endpoint, elapsed);

        match result {
            Ok(status) if status == "healthy" => {
                HealthCheck::healthy(COMPONENT, endpoint, elapsed)
            }
            Ok(status) => HealthCheck::degraded(
                COMPONENT,
                endpoint,
                format!("service reported status {:?}", status),
                elapsed,
            ),
            Err(err) => HealthCheck::unhealthy(
                COMPONENT,
                endpoint,
                format!("{}: {}", err.kind(), err),
                elapsed,
            ),
        }
    }
}
