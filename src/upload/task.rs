//! A single file upload

use std::path::PathBuf;

use tracing::{error, info};

use super::rate_limiter::RateLimiter;
use super::retry::RetryPolicy;
use crate::client::CollectionApi;
use crate::error::UploadError;
use crate::utils::content_type::content_type_for;

/// One file bound for one destination name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub source: PathBuf,
    pub document_name: String,
    pub collection_id: String,
}

/// Outcome of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub document_name: String,
    pub succeeded: bool,
    pub file_id: Option<String>,
    pub attempts: u32,
}

impl UploadResult {
    pub fn failed(document_name: &str, attempts: u32) -> Self {
        Self {
            document_name: document_name.to_string(),
            succeeded: false,
            file_id: None,
            attempts,
        }
    }
}

impl UploadTask {
    /// Read, upload and retry on throttling. Never returns an error; failures
    /// are logged and reported through `succeeded`.
    pub async fn execute<C>(
        &self,
        api: &C,
        limiter: &RateLimiter,
        policy: &RetryPolicy,
    ) -> UploadResult
    where
        C: CollectionApi + ?Sized,
    {
        let content_type = content_type_for(&self.source);

        let attempted = policy
            .run(limiter, &self.document_name, |_attempt| {
                let content_type = content_type.as_str();
                async move {
                    let data = tokio::fs::read(&self.source)
                        .await
                        .map_err(|source| UploadError::Io {
                            path: self.source.clone(),
                            source,
                        })?;

                    info!(
                        "Uploading: {} ({:.2} KB)",
                        self.document_name,
                        data.len() as f64 / 1024.0
                    );

                    api.upload_document(&self.collection_id, &self.document_name, data, content_type)
                        .await
                }
            })
            .await;

        match attempted.result {
            Ok(document) => {
                info!(
                    "Success: {} (File ID: {})",
                    self.document_name, document.file_id
                );
                UploadResult {
                    document_name: self.document_name.clone(),
                    succeeded: true,
                    file_id: Some(document.file_id),
                    attempts: attempted.attempts,
                }
            }
            Err(e) => {
                error!("Error uploading {}: {}", self.document_name, e);
                UploadResult::failed(&self.document_name, attempted.attempts)
            }
        }
    }
}
