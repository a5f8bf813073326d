mod health;
mod scan;
mod upload;

pub use health::health;
pub use scan::{scan_upload, test_upload};
pub use upload::upload_image;
