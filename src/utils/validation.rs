// file: src/utils/validation.rs
// description: command input validation helpers
// reference: input validation patterns

use crate::error::ValidationError;
use std::fs;
use std::path::Path;

type Result<T> = std::result::Result<T, ValidationError>;

pub struct Validator;

impl Validator {
    /// Accepts existing regular files whose extension maps to an `image/*` type.
    pub fn validate_image_path(path: &Path) -> Result<()> {
        let metadata = fs::metadata(path).map_err(|e| {
            ValidationError(format!(
                "Cannot access image file {}: {}",
                path.display(),
                e
            ))
        })?;

        if !metadata.is_file() {
            return Err(ValidationError(format!(
                "Path is not a file: {}",
                path.display()
            )));
        }

        let is_image = mime_guess::from_path(path)
            .first()
            .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE);
        if !is_image {
            return Err(ValidationError(format!(
                "File does not appear to be an image: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_threshold(threshold: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ValidationError(format!(
                "Threshold must be between 0.0 and 1.0, got {}",
                threshold
            )));
        }
        Ok(())
    }

    pub fn validate_limit(limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(ValidationError(
                "Limit must be greater than 0".to_string(),
            ));
        }

        if limit > 100 {
            return Err(ValidationError("Limit too large (max 100)".to_string()));
        }

        Ok(())
    }

    pub fn validate_content_not_empty(content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(ValidationError("Content is empty".to_string()));
        }
        Ok(())
    }

    pub fn validate_output_directory(path: &Path) -> Result<()> {
        if path.exists() && !path.is_dir() {
            return Err(ValidationError(format!(
                "Output path is not a directory: {}",
                path.display()
            )));
        }
        Ok(())
    }

    /// Keeps only the final path component so a server-supplied name cannot
    /// escape the output directory.
    pub fn sanitize_filename(name: &str) -> String {
        let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
        match base {
            "" | "." | ".." => "image".to_string(),
            other => other.to_string(),
        }
    }
}
