use axum::extract::{Multipart, State};
use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::AppState;

const FIELD_NAME: &str = "image";

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub message: String,
    pub success: bool,
    pub url: String,
}

struct ImageField {
    content_type: String,
    data: Bytes,
    file_name: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// `POST /upload`: one image in the `image` field, uploaded under a fresh key.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let max_upload_size = state.config.max_upload_size;
    let mut image: Option<ImageField> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e, max_upload_size))?
    {
        if field.name() != Some(FIELD_NAME) {
            // Ignore unknown fields
            continue;
        }
        if image.is_some() {
            return Err(ApiError::bad_request("Only one image may be uploaded per request"));
        }

        let file_name = field.file_name().unwrap_or_default().to_string();

        // Determine MIME type: from multipart Content-Type, or guess from filename
        let content_type = field
            .content_type()
            .filter(|ct| *ct != "application/octet-stream")
            .map(|ct| ct.to_string())
            .or_else(|| mime_guess::from_path(&file_name).first().map(|m| m.to_string()))
            .unwrap_or_default();

        if !content_type.starts_with("image/") {
            return Err(ApiError::unsupported_media_type("Only image files are allowed"));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::from_multipart(e, max_upload_size))?;

        if data.len() as u64 > max_upload_size {
            return Err(ApiError::payload_too_large(format!(
                "File exceeds maximum upload size of {max_upload_size} bytes"
            )));
        }

        image = Some(ImageField {
            content_type,
            data,
            file_name,
        });
    }

    let image = image.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;

    let result = state
        .uploader
        .upload_bytes(image.data, &image.file_name, Some(&image.content_type))
        .await;

    match (result.url, result.uploaded_name) {
        (Some(url), Some(filename)) if result.success => Ok(Json(UploadResponse {
            filename,
            message: "Image uploaded successfully".to_string(),
            success: true,
            url,
        })),
        _ => Err(ApiError::internal("Failed to upload image")
            .with_details(result.error.unwrap_or_default())),
    }
}
