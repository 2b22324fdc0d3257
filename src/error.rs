// file: src/error.rs
// description: closed error taxonomy for service calls and configuration errors
// reference: https://docs.rs/thiserror

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Longest service error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// Every failure surfaced by the search and ingestion client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Invalid service endpoint {input:?}: {reason}")]
    InvalidEndpoint { input: String, reason: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Service at {url} returned status {status}: {body}")]
    Service {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Malformed search result: {0}")]
    MalformedResult(String),
}

/// Fieldless mirror of [`ClientError`] for callers that only match on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidEndpoint,
    Transport,
    Service,
    Decode,
    MalformedResult,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidEndpoint => "invalid endpoint",
            ErrorKind::Transport => "transport error",
            ErrorKind::Service => "service error",
            ErrorKind::Decode => "decode error",
            ErrorKind::MalformedResult => "malformed result",
        };
        f.write_str(name)
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::InvalidEndpoint { .. } => ErrorKind::InvalidEndpoint,
            ClientError::Transport { .. } => ErrorKind::Transport,
            ClientError::Service { .. } => ErrorKind::Service,
            ClientError::Decode { .. } => ErrorKind::Decode,
            ClientError::MalformedResult(_) => ErrorKind::MalformedResult,
        }
    }

    /// HTTP status of a service error, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn invalid_endpoint(input: &str, reason: impl Into<String>) -> Self {
        ClientError::InvalidEndpoint {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Wraps any lower-layer failure where no response reached us.
    pub fn transport(url: &str, err: impl fmt::Display) -> Self {
        ClientError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Classifies a non-success response. The body is kept, trimmed, for diagnostics.
    pub fn from_status(status: u16, url: &str, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        let body = if text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &text[..cut])
        } else {
            text.to_string()
        };

        ClientError::Service {
            status,
            url: url.to_string(),
            body,
        }
    }

    pub fn decode(url: &str, err: impl fmt::Display) -> Self {
        ClientError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Aggregate failure of a concurrent image upload.
///
/// Uploads issued before the failure was observed are not cancelled, so any
/// subset of the other images may have been stored.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Upload of image #{} ({filename}) failed: {source}", .index + 1)]
pub struct ImageBatchError {
    pub index: usize,
    pub filename: String,
    #[source]
    pub source: ClientError,
}

impl ImageBatchError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Rejected command input, raised before any request is made.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Validation error: {0}")]
pub struct ValidationError(pub String);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = ClientError::from_status(500, "http://localhost:8000/documents", b"boom");
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.status(), Some(500));

        let err = ClientError::transport("http://localhost:8000/search", "connection refused");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), None);

        assert_eq!(
            ClientError::MalformedResult("x".into()).kind(),
            ErrorKind::MalformedResult
        );
    }

    #[test]
    fn test_service_error_body_truncated() {
        let body = "é".repeat(600);
        let err = ClientError::from_status(502, "http://svc", body.as_bytes());
        match err {
            ClientError::Service { body, .. } => {
                assert!(body.ends_with("..."));
                assert!(body.len() <= MAX_ERROR_BODY + 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_messages_name_the_offending_input() {
        let err = ClientError::invalid_endpoint("::nope::", "no host");
        assert!(err.to_string().contains("::nope::"));

        let err = ClientError::transport("http://svc/search", "refused");
        assert!(err.to_string().contains("http://svc/search"));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Service.to_string(), "service error");
        assert_eq!(
            ClientError::decode("http://svc", "eof").kind().to_string(),
            "decode error"
        );
    }

    #[test]
    fn test_batch_error_delegates_kind() {
        let err = ImageBatchError {
            index: 1,
            filename: "b.png".to_string(),
            source: ClientError::from_status(500, "http://svc/images", b""),
        };
        assert_eq!(err.kind(), ErrorKind::Service);
        assert!(err.to_string().contains("#2"));
        assert!(err.to_string().contains("b.png"));
    }
}
