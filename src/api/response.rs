use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

// ============================================================================
// Error body
// ============================================================================

/// Body of every non-2xx response: `{success: false, error, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(
        default,
        rename = "testFile",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_file: Option<String>,
}

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// Handler error: a short `error` summary plus optional `details`.
#[derive(Debug)]
pub struct ApiError {
    pub details: Option<String>,
    pub error: String,
    pub status: StatusCode,
    pub test_file: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                success: false,
                error: self.error,
                details: self.details,
                test_file: self.test_file,
            }),
        )
            .into_response()
    }
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            details: None,
            error: error.into(),
            status,
            test_file: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_test_file(mut self, test_file: impl Into<String>) -> Self {
        self.test_file = Some(test_file.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Body-limit rejections surface as 413, everything else as a malformed request.
    pub fn from_multipart(e: MultipartError, max_upload_size: u64) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large(format!(
                "File exceeds maximum upload size of {max_upload_size} bytes"
            ))
        } else {
            Self::bad_request("Invalid multipart data").with_details(e.body_text())
        }
    }
}
