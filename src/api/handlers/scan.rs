use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::upload::{ReconcileError, UploadResult, UploadSummary};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: String,
    pub results: Vec<UploadResult>,
    pub success: bool,
    pub summary: UploadSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUploadResponse {
    pub message: String,
    pub success: bool,
    pub test_file: String,
    pub total_images_found: usize,
    pub uploaded_url: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /scan-upload`: one reconciliation pass over the watch directory.
pub async fn scan_upload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ScanResponse>, ApiError> {
    let results = state.reconciler.reconcile_all().await.map_err(|e| {
        tracing::error!(error = %e, "Directory scan failed");
        ApiError::internal("Failed to scan and upload").with_details(e.to_string())
    })?;

    Ok(Json(ScanResponse {
        message: "Scan and upload completed".to_string(),
        summary: UploadSummary::from_results(&results),
        results,
        success: true,
    }))
}

/// `POST /test-upload`: upload only the first eligible file to validate credentials.
pub async fn test_upload(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TestUploadResponse>, ApiError> {
    let first = state.reconciler.upload_first().await.map_err(|e| match e {
        ReconcileError::DirectoryNotFound(path) => ApiError::not_found("Upload directory not found")
            .with_details(path.display().to_string()),
        ReconcileError::NoEligibleFiles(path) => {
            ApiError::not_found("No image files found").with_details(path.display().to_string())
        }
        ReconcileError::Io(e) => ApiError::internal("Test upload failed").with_details(e.to_string()),
    })?;

    match first.result.url {
        Some(url) if first.result.success => Ok(Json(TestUploadResponse {
            message: "Test upload successful, credentials are working".to_string(),
            success: true,
            test_file: first.file_name,
            total_images_found: first.total_found,
            uploaded_url: url,
        })),
        _ => Err(ApiError::internal("Test upload failed")
            .with_details(first.result.error.unwrap_or_default())
            .with_test_file(first.file_name)),
    }
}
