use std::path::Path;

use super::executor::UploadResult;

/// Receives the outcome of uploads nobody is waiting on.
pub trait UploadObserver: Send + Sync {
    fn upload_finished(&self, path: &Path, result: &UploadResult);
}

/// Default observer: reports through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl UploadObserver for LogObserver {
    fn upload_finished(&self, path: &Path, result: &UploadResult) {
        if result.success {
            tracing::info!(
                path = %path.display(),
                url = result.url.as_deref().unwrap_or_default(),
                "Watched file uploaded"
            );
        } else {
            tracing::warn!(
                path = %path.display(),
                error = result.error.as_deref().unwrap_or_default(),
                "Watched file dropped after failed upload"
            );
        }
    }
}
