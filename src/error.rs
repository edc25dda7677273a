//! Upload error type and rate-limit classification

use std::path::PathBuf;

use thiserror::Error;

/// HTTP status the collection service returns when throttling
pub const RATE_LIMIT_STATUS: u16 = 429;

/// Error raised by a single upload attempt or collection lookup
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Other(String),
}

impl UploadError {
    /// Numeric status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Retry classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    RateLimited,
    Permanent,
}

/// Decide whether a failure was caused by request throttling.
///
/// Checks the status code first, then falls back to a case-insensitive search
/// for "rate limit" or "429" in the error text. The text match is a heuristic:
/// throttling errors worded differently are treated as permanent, and unrelated
/// errors that happen to mention "429" are retried.
pub fn classify_failure(error: &UploadError) -> FailureClass {
    if error.status() == Some(RATE_LIMIT_STATUS) {
        return FailureClass::RateLimited;
    }

    let message = error.to_string().to_lowercase();
    if message.contains("rate limit") || message.contains("429") {
        FailureClass::RateLimited
    } else {
        FailureClass::Permanent
    }
}
