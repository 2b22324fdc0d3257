// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod document;
pub mod image;
pub mod search_result;

pub use document::{AddDocumentResponse, Document};
pub use image::{AddImageResponse, ImageMetadata, ImageResult, SimilarImagesResponse};
pub use search_result::{
    RawContent, RawSearchHit, RawSearchResponse, SearchQuery, SourceType, UnifiedContent,
    UnifiedSearchResult,
};
