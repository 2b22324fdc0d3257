// file: src/client/normalizer.rs
// description: maps raw search hits onto the tagged text/image result model
// reference: internal data structures

use crate::error::{ClientError, Result};
use crate::models::{RawSearchHit, UnifiedContent, UnifiedSearchResult};
use tracing::warn;

/// Normalizes one raw hit. Modality comes from `source_type` alone; fields
/// belonging to the other arm are ignored, never used to guess.
pub fn normalize(raw: RawSearchHit) -> Result<UnifiedSearchResult> {
    let id = raw
        .id
        .ok_or_else(|| ClientError::MalformedResult("hit without id".to_string()))?;

    let score = raw
        .score
        .filter(|s| s.is_finite())
        .ok_or_else(|| ClientError::MalformedResult(format!("hit {} has no usable score", id)))?;
    if !is_unit_score(score) {
        // kept as reported; the service owns the metric
        warn!("hit {} has score {} outside [0, 1]", id, score);
    }

    let source_type = raw.source_type.unwrap_or_default();
    let content = raw.content.unwrap_or_default();

    let content = match source_type.as_str() {
        "text" => {
            let text = content.text.ok_or_else(|| {
                ClientError::MalformedResult(format!("text hit {} has no text", id))
            })?;
            UnifiedContent::Text { text }
        }
        "image" => {
            let metadata = content.metadata.ok_or_else(|| {
                ClientError::MalformedResult(format!("image hit {} has no metadata", id))
            })?;
            let image_data = content.image_data.ok_or_else(|| {
                ClientError::MalformedResult(format!("image hit {} has no image_data", id))
            })?;
            UnifiedContent::Image {
                metadata,
                image_data,
            }
        }
        other => {
            return Err(ClientError::MalformedResult(format!(
                "hit {} has unknown source_type {:?}",
                id, other
            )));
        }
    };

    Ok(UnifiedSearchResult { id, score, content })
}

fn is_unit_score(score: f64) -> bool {
    (0.0..=1.0).contains(&score)
}

pub fn normalize_all(hits: Vec<RawSearchHit>) -> Result<Vec<UnifiedSearchResult>> {
    hits.into_iter().map(normalize).collect()
}
