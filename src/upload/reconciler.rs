use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::classify::is_image_file;
use super::executor::{UploadResult, Uploader};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Upload directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("No image files found in {}", .0.display())]
    NoEligibleFiles(PathBuf),
}

/// Success/failure counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl UploadSummary {
    pub fn from_results(results: &[UploadResult]) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            successful,
            failed: results.len() - successful,
        }
    }
}

/// Result of uploading only the first eligible file.
#[derive(Debug, Clone)]
pub struct FirstUpload {
    pub file_name: String,
    pub total_found: usize,
    pub result: UploadResult,
}

/// Scans the watch directory and uploads every eligible image in it.
pub struct Reconciler {
    concurrency: usize,
    directory: PathBuf,
    uploader: Arc<Uploader>,
}

impl Reconciler {
    pub fn new(uploader: Arc<Uploader>, directory: impl Into<PathBuf>, concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            directory: directory.into(),
            uploader,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// One full pass: create the directory if needed, upload every eligible file.
    /// Individual failures are reported in the results; only file-system errors are `Err`.
    #[instrument(skip(self), fields(directory = %self.directory.display()))]
    pub async fn reconcile_all(&self) -> Result<Vec<UploadResult>, ReconcileError> {
        if !tokio::fs::try_exists(&self.directory).await? {
            tokio::fs::create_dir_all(&self.directory).await?;
            info!("Created upload directory");
        }

        let files = self.eligible_files().await?;
        if files.is_empty() {
            info!("No image files found");
            return Ok(Vec::new());
        }

        info!(count = files.len(), "Found images to upload");

        let results: Vec<UploadResult> = stream::iter(files)
            .map(|(path, name)| {
                let uploader = Arc::clone(&self.uploader);
                async move { uploader.upload_file(&path, &name).await }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let summary = UploadSummary::from_results(&results);
        info!(
            successful = summary.successful,
            failed = summary.failed,
            "Upload pass complete"
        );

        Ok(results)
    }

    /// Upload just the first eligible file, e.g. to check credentials.
    /// Unlike a full pass this never creates the directory.
    pub async fn upload_first(&self) -> Result<FirstUpload, ReconcileError> {
        if !tokio::fs::try_exists(&self.directory).await? {
            return Err(ReconcileError::DirectoryNotFound(self.directory.clone()));
        }

        let files = self.eligible_files().await?;
        let total_found = files.len();
        let (path, file_name) = files
            .into_iter()
            .next()
            .ok_or_else(|| ReconcileError::NoEligibleFiles(self.directory.clone()))?;

        info!(file = %file_name, "Test upload");
        let result = self.uploader.upload_file(&path, &file_name).await;

        Ok(FirstUpload {
            file_name,
            total_found,
            result,
        })
    }

    /// Allow-listed names that are not known to be something other than a file,
    /// sorted by name. An entry that cannot be stat'ed is kept so its upload
    /// reports the failure instead of aborting the pass.
    async fn eligible_files(&self) -> Result<Vec<(PathBuf, String)>, ReconcileError> {
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_image_file(&name) {
                continue;
            }
            let path = entry.path();
            match tokio::fs::metadata(&path).await {
                Ok(meta) if !meta.is_file() => continue,
                Ok(_) => {}
                Err(e) => warn!(file = %name, error = %e, "Cannot stat directory entry"),
            }
            files.push((path, name));
        }

        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files)
    }
}
