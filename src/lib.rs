// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

pub use client::{
    Endpoint, FormField, HealthProbe, HttpTransport, ImageUpload, IngestClient, RelaxEvent,
    RequestBody, SearchClient, SearchObserver, SearchOutcome, ServiceClients, Transport,
    TransportResponse,
};
pub use config::{Config, ImageConfig, SearchConfig, ServiceConfig};
pub use error::{ClientError, ConfigError, ErrorKind, ImageBatchError, Result, ValidationError};
pub use models::{
    AddImageResponse, Document, ImageMetadata, ImageResult, UnifiedContent, UnifiedSearchResult,
};
pub use utils::{HealthReport, OperationTimer, RelaxSpinner, Validator};
