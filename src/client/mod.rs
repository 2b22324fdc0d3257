// file: src/client/mod.rs
// description: search and ingestion client for the embedding service
// reference: internal module structure

pub mod endpoint;
pub mod health;
pub mod ingest;
pub mod normalizer;
pub mod search;
pub mod transport;

pub use endpoint::Endpoint;
pub use health::HealthProbe;
pub use ingest::{ImageUpload, IngestClient};
pub use normalizer::{normalize, normalize_all};
pub use search::{
    NoopObserver, RELAX_STEP, RelaxEvent, SearchClient, SearchObserver, SearchOutcome,
    THRESHOLD_FLOOR,
};
pub use transport::{FormField, HttpTransport, RequestBody, Transport, TransportResponse};

use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;

/// Ingestion, search and health clients sharing one endpoint and transport.
pub struct ServiceClients {
    pub endpoint: Endpoint,
    pub ingest: IngestClient,
    pub search: SearchClient,
    pub health: HealthProbe,
}

impl ServiceClients {
    /// Resolves the configured endpoint and binds a reqwest transport.
    pub fn from_config(config: &Config) -> Result<Self> {
        let endpoint = Endpoint::resolve(&config.service.endpoint)?;
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(config.service.timeout())?);
        Ok(Self::with_transport(config, endpoint, transport))
    }

    pub fn with_transport(
        config: &Config,
        endpoint: Endpoint,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            ingest: IngestClient::new(endpoint.clone(), transport.clone()),
            search: SearchClient::new(endpoint.clone(), transport.clone(), &config.search),
            health: HealthProbe::new(endpoint.clone(), transport),
            endpoint,
        }
    }
}
