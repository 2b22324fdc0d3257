// file: src/client/ingest.rs
// description: submits text documents and images to the embedding service
// reference: POST /documents, POST /images, POST /images/similar

use crate::client::endpoint::Endpoint;
use crate::client::transport::{FormField, RequestBody, Transport};
use crate::error::{ClientError, ImageBatchError, Result};
use crate::models::{
    AddDocumentResponse, AddImageResponse, Document, ImageResult, SimilarImagesResponse,
};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

const QUERY_IMAGE_NAME: &str = "query_image";

/// One image of a batch upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }
}

#[derive(Clone)]
pub struct IngestClient {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
}

impl IngestClient {
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    /// Stores a text document and returns its id.
    pub async fn add_document(&self, text: &str) -> Result<String> {
        let url = self.endpoint.url_for("/documents");
        let body = serde_json::to_vec(&Document::new(text))
            .map_err(|e| ClientError::transport(&url, format!("encoding document: {}", e)))?;

        debug!("Adding document of {} chars", text.len());
        let response: AddDocumentResponse = self
            .transport
            .post(&url, RequestBody::Json(body))
            .await?
            .into_json(&url)?;

        info!("Stored document {}", response.document_id);
        Ok(response.document_id)
    }

    pub async fn add_image(&self, data: Vec<u8>, filename: &str) -> Result<AddImageResponse> {
        let url = self.endpoint.url_for("/images");
        let content_type = guess_content_type(filename);
        let form = vec![FormField::file("image", filename, &content_type, data)];

        debug!("Uploading image {} ({})", filename, content_type);
        let response: AddImageResponse = self
            .transport
            .post(&url, RequestBody::Form(form))
            .await?
            .into_json(&url)?;

        info!("Stored image {} as {}", filename, response.image_id);
        Ok(response)
    }

    /// Uploads all images concurrently.
    ///
    /// The first failure observed is returned and nothing else is reported.
    /// Uploads already issued keep running to completion, so when this
    /// returns an error any subset of the other images may have been stored.
    pub async fn add_images(
        &self,
        uploads: Vec<ImageUpload>,
    ) -> std::result::Result<Vec<AddImageResponse>, ImageBatchError> {
        info!("Uploading {} images", uploads.len());

        let tasks = uploads.into_iter().enumerate().map(|(index, upload)| {
            let client = self.clone();
            let filename = upload.filename.clone();
            let handle = tokio::spawn(async move {
                client.add_image(upload.data, &upload.filename).await
            });

            async move {
                let source = match handle.await {
                    Ok(Ok(response)) => return Ok(response),
                    Ok(Err(err)) => err,
                    Err(join_err) => ClientError::transport(&filename, join_err),
                };
                warn!("Upload of {} failed: {}", filename, source);
                Err(ImageBatchError {
                    index,
                    filename,
                    source,
                })
            }
        });

        try_join_all(tasks).await
    }

    pub async fn find_similar_images(
        &self,
        data: Vec<u8>,
        limit: usize,
        score_threshold: f64,
    ) -> Result<Vec<ImageResult>> {
        let url = self.endpoint.url_for("/images/similar");
        let form = vec![
            FormField::file("image", QUERY_IMAGE_NAME, "application/octet-stream", data),
            FormField::text("limit", limit.to_string()),
            FormField::text("score_threshold", score_threshold.to_string()),
        ];

        let response: SimilarImagesResponse = self
            .transport
            .post(&url, RequestBody::Form(form))
            .await?
            .into_json(&url)?;

        debug!("Found {} similar images", response.results.len());
        Ok(response.results)
    }
}

fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}
