//! image-uploader - Uploads images to S3-compatible object storage
//!
//! Images arrive two ways:
//! - `POST /upload` multipart form uploads
//! - Files dropped into a local directory, picked up by a startup scan, a
//!   manual `POST /scan-upload`, or the file watcher
//!
//! Every upload gets a fresh UUID key and a public URL. Local files are never
//! deleted, so a rescan uploads them again under new keys.

pub mod api;
pub mod config;
pub mod object_store;
#[cfg(test)]
pub mod testutil;
pub mod upload;

use std::sync::Arc;

use config::Config;
use upload::{Reconciler, Uploader};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub reconciler: Reconciler,
    pub uploader: Arc<Uploader>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn object_store::ObjectStore>) -> Self {
        let uploader = Arc::new(Uploader::new(store, config.storage.key_prefix.clone()));
        let reconciler = Reconciler::new(
            Arc::clone(&uploader),
            &config.watch.directory,
            config.watch.scan_concurrency,
        );
        Self {
            config,
            reconciler,
            uploader,
        }
    }
}
