//! collection-uploader library - batch uploads of local files into a remote document collection

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod upload;
pub mod utils;

// Re-export commonly used types
pub use client::{Collection, CollectionApi, UploadedDocument, XaiClient};
pub use config::{Config, ConfigOptions, Credentials};
pub use error::{classify_failure, FailureClass, UploadError};
pub use upload::{Coordinator, RateLimiter, RetryPolicy, RunOutcome, UploadSummary, UploadTask};
