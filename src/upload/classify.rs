//! Decides which files count as images and what content-type they declare.

use std::path::Path;

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Lowercased extension without the dot, if the name has one.
fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Whether the file name carries an allow-listed image extension.
pub fn is_image_file(filename: &str) -> bool {
    content_type_for(filename) != FALLBACK_CONTENT_TYPE
}

/// Canonical content-type for an allow-listed extension, the generic binary type otherwise.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension(filename).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => FALLBACK_CONTENT_TYPE,
    }
}
