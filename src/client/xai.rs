//! HTTP client for the xAI files and collections APIs

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{Collection, CollectionApi, UploadedDocument};
use crate::config::{Config, Credentials};
use crate::error::UploadError;

/// User-Agent header value
const USER_AGENT: &str = concat!("collection-uploader/", env!("CARGO_PKG_VERSION"));

/// Collection lookup response
#[derive(Debug, Deserialize)]
struct CollectionResponse {
    #[serde(alias = "collection_id")]
    id: String,
    #[serde(alias = "collection_name", default)]
    name: Option<String>,
}

/// File upload response
#[derive(Debug, Deserialize)]
struct FileResponse {
    #[serde(alias = "file_id")]
    id: String,
}

/// xAI API client
pub struct XaiClient {
    api_base_url: String,
    management_base_url: String,
    credentials: Credentials,
    client: Client,
    /// Files uploaded but not yet attached, keyed by (collection id, document name)
    pending: Mutex<HashMap<(String, String), String>>,
}

impl XaiClient {
    pub fn new(config: &Config) -> Result<Self, UploadError> {
        Self::with_endpoints(
            config.api_base_url.clone(),
            config.management_base_url.clone(),
            config.credentials.clone(),
            Duration::from_secs(config.upload_timeout_secs),
        )
    }

    pub fn with_endpoints(
        api_base_url: String,
        management_base_url: String,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            api_base_url,
            management_base_url,
            credentials,
            client,
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// Turn a non-success response into an API error carrying its status
    async fn check_status(response: Response) -> Result<Response, UploadError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = if text.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            text
        };

        Err(UploadError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn upload_file(
        &self,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let url = format!("{}/v1/files", self.api_base_url);
        let part = Part::bytes(data)
            .file_name(name.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .header("x-request-id", Uuid::new_v4().to_string())
            .bearer_auth(&self.credentials.api_key)
            .multipart(form)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let file: FileResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        Ok(file.id)
    }

    async fn add_document(&self, collection_id: &str, file_id: &str) -> Result<(), UploadError> {
        let url = format!(
            "{}/v1/collections/{}/documents/{}",
            self.management_base_url, collection_id, file_id
        );

        let response = self
            .client
            .post(&url)
            .header("x-request-id", Uuid::new_v4().to_string())
            .bearer_auth(&self.credentials.management_api_key)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }

    fn pending_file(&self, key: &(String, String)) -> Option<String> {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.get(key).cloned()
    }

    fn set_pending(&self, key: (String, String), file_id: Option<String>) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        match file_id {
            Some(id) => {
                pending.insert(key, id);
            }
            None => {
                pending.remove(&key);
            }
        }
    }
}

#[async_trait]
impl CollectionApi for XaiClient {
    async fn get_collection(&self, collection_id: &str) -> Result<Collection, UploadError> {
        let url = format!(
            "{}/v1/collections/{}",
            self.management_base_url, collection_id
        );

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(60))
            .header("x-request-id", Uuid::new_v4().to_string())
            .bearer_auth(&self.credentials.management_api_key)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let collection: CollectionResponse = response
            .json()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

        Ok(Collection {
            id: collection.id,
            name: collection.name.unwrap_or_else(|| "Unknown".to_string()),
        })
    }

    async fn upload_document(
        &self,
        collection_id: &str,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<UploadedDocument, UploadError> {
        let key = (collection_id.to_string(), name.to_string());

        // A retry after a failed attach reuses the file already uploaded
        let file_id = match self.pending_file(&key) {
            Some(file_id) => {
                debug!("Reusing uploaded file {} for {}", file_id, name);
                file_id
            }
            None => {
                let file_id = self.upload_file(name, data, content_type).await?;
                debug!("Uploaded file {} as {}, adding to collection", name, file_id);
                file_id
            }
        };

        if let Err(e) = self.add_document(collection_id, &file_id).await {
            warn!(
                "File {} ({}) was uploaded but not added to collection {}: {}",
                file_id, name, collection_id, e
            );
            self.set_pending(key, Some(file_id));
            return Err(e);
        }

        self.set_pending(key, None);
        Ok(UploadedDocument { file_id })
    }
}
