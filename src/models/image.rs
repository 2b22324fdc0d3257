// file: src/models/image.rs
// description: image metadata and image ingestion / similarity response models
// reference: POST /images and POST /images/similar contracts of the embedding service

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ImageMetadata {
    pub filename: String,
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddImageResponse {
    pub image_id: String,
    #[serde(default)]
    pub status: String,
    pub metadata: ImageMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageResult {
    pub id: String,
    pub score: f64,
    pub metadata: ImageMetadata,
    /// Base64-encoded image bytes.
    #[serde(default)]
    pub image_data: String,
}

impl ImageResult {
    pub fn decode_image_data(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.image_data.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarImagesResponse {
    #[serde(default)]
    pub query_image: String,
    pub results: Vec<ImageResult>,
}
