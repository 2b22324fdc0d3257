// file: src/models/search_result.rs
// description: unified text/image search result model and raw wire shapes
// reference: GET /search contract of the embedding service

use super::image::ImageMetadata;
use serde::{Deserialize, Serialize};

/// Parameters of a single search request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub limit: usize,
    pub score_threshold: f64,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, limit: usize, score_threshold: f64) -> Self {
        Self {
            query: query.into(),
            limit,
            score_threshold,
        }
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("query", self.query.clone()),
            ("limit", self.limit.to_string()),
            ("score_threshold", self.score_threshold.to_string()),
        ]
    }
}

/// Search hit exactly as the service sends it. Every field is optional so
/// that shape problems surface as `MalformedResult` instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawSearchHit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub content: Option<RawContent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawContent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: Option<ImageMetadata>,
    #[serde(default)]
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub query: String,
    pub results: Vec<RawSearchHit>,
    #[serde(default)]
    pub time_taken: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Text,
    Image,
}

/// Content of a result, keyed by modality. Serialized adjacently tagged so the
/// wire form keeps `source_type` next to `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source_type", content = "content", rename_all = "lowercase")]
pub enum UnifiedContent {
    Text {
        text: String,
    },
    Image {
        metadata: ImageMetadata,
        /// Base64-encoded image bytes.
        image_data: String,
    },
}

impl UnifiedContent {
    pub fn source_type(&self) -> SourceType {
        match self {
            UnifiedContent::Text { .. } => SourceType::Text,
            UnifiedContent::Image { .. } => SourceType::Image,
        }
    }
}

/// A normalized search hit. The modality lives only in `content`, so a
/// result can never carry fields from both arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSearchResult {
    pub id: String,
    pub score: f64,
    #[serde(flatten)]
    pub content: UnifiedContent,
}

impl UnifiedSearchResult {
    pub fn source_type(&self) -> SourceType {
        self.content.source_type()
    }
}
