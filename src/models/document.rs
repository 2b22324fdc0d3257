// file: src/models/document.rs
// description: text document request payload and ingestion response
// reference: POST /documents contract of the embedding service

use serde::{Deserialize, Serialize};

/// Request body for a new text document. Not retained after submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddDocumentResponse {
    pub document_id: String,
    #[serde(default)]
    pub status: String,
}
