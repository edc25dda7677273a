//! Collection API boundary
//!
//! The uploader only needs two operations from the remote service: look up a
//! collection and upload one document into it. Both go through the
//! [`CollectionApi`] trait so the coordinator can run against the HTTP client
//! or an in-memory fake.

mod xai;

use async_trait::async_trait;

use crate::error::UploadError;

pub use xai::XaiClient;

/// Remote collection metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

/// Result of a successful document upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    pub file_id: String,
}

#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// Fetch a collection by id
    async fn get_collection(&self, collection_id: &str) -> Result<Collection, UploadError>;

    /// Upload a document into a collection
    async fn upload_document(
        &self,
        collection_id: &str,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedDocument, UploadError>;
}
