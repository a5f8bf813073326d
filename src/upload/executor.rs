use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use super::classify::content_type_for;
use super::naming::StorageKey;
use crate::object_store::ObjectStore;

/// Outcome of one upload attempt. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResult {
    fn succeeded(key: &StorageKey, url: String, original_name: &str) -> Self {
        Self {
            success: true,
            key: Some(key.to_string()),
            url: Some(url),
            original_name: original_name.to_string(),
            uploaded_name: Some(key.file_name().to_string()),
            error: None,
        }
    }

    fn failed(original_name: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            key: None,
            url: None,
            original_name: original_name.to_string(),
            uploaded_name: None,
            error: Some(error.into()),
        }
    }
}

/// The single point of contact with the storage backend.
pub struct Uploader {
    key_prefix: String,
    store: Arc<dyn ObjectStore>,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            store,
        }
    }

    /// Upload an in-memory buffer. `content_type` overrides the extension-derived type.
    #[instrument(skip(self, data), fields(file = %original_filename, size = data.len()))]
    pub async fn upload_bytes(
        &self,
        data: Bytes,
        original_filename: &str,
        content_type: Option<&str>,
    ) -> UploadResult {
        let key = StorageKey::generate(&self.key_prefix, original_filename);
        let content_type = content_type.unwrap_or_else(|| content_type_for(original_filename));

        debug!(key = %key, content_type, "Uploading");

        match self.store.put(key.as_str(), data, content_type).await {
            Ok(()) => {
                let url = self.store.public_url(key.as_str());
                info!(key = %key, url = %url, "Uploaded");
                UploadResult::succeeded(&key, url, original_filename)
            }
            Err(e) => {
                error!(error = %e, "Upload failed");
                UploadResult::failed(original_filename, e.to_string())
            }
        }
    }

    /// Read a local file fully and upload it. The file is left in place.
    pub async fn upload_file(&self, path: &Path, original_filename: &str) -> UploadResult {
        match tokio::fs::read(path).await {
            Ok(data) => self.upload_bytes(Bytes::from(data), original_filename, None).await,
            Err(e) => {
                error!(file = %original_filename, path = %path.display(), error = %e, "Failed to read file");
                UploadResult::failed(original_filename, format!("Failed to read file: {e}"))
            }
        }
    }
}
