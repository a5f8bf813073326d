//! Shared test helpers for image-uploader unit tests.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{Config, ServerConfig, StorageConfig, WatchConfig};
use crate::object_store::{ObjectStore, ObjectStoreError};
use crate::upload::{UploadObserver, UploadResult};
use crate::AppState;

#[derive(Debug, Clone)]
pub struct RecordedPut {
    pub key: String,
    pub data: Bytes,
    pub content_type: String,
}

/// In-memory store that records every put and can be told to fail.
#[derive(Default)]
pub struct MemoryStore {
    attempts: AtomicUsize,
    fail_with: Option<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    put_delay: Option<Duration>,
    puts: Mutex<Vec<RecordedPut>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    /// Successful puts, in completion order.
    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }

    /// Every put call, successful or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(ref message) = self.fail_with {
            return Err(ObjectStoreError::Backend(message.clone()));
        }

        self.puts.lock().unwrap().push(RecordedPut {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://test.local/{key}")
    }
}

/// Observer that keeps every result it is handed.
#[derive(Default)]
pub struct RecordingObserver {
    results: Mutex<Vec<(PathBuf, UploadResult)>>,
}

impl RecordingObserver {
    pub fn results(&self) -> Vec<(PathBuf, UploadResult)> {
        self.results.lock().unwrap().clone()
    }
}

impl UploadObserver for RecordingObserver {
    fn upload_finished(&self, path: &Path, result: &UploadResult) {
        self.results
            .lock()
            .unwrap()
            .push((path.to_path_buf(), result.clone()));
    }
}

/// Create a test AppState watching `watch_dir`, backed by `store`.
pub fn test_state(watch_dir: &Path, store: Arc<MemoryStore>) -> Arc<AppState> {
    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            public_dir: watch_dir.join("public").to_string_lossy().to_string(),
            service_name: "Test Image Upload".to_string(),
        },
        storage: StorageConfig::default(),
        watch: WatchConfig {
            directory: watch_dir.to_string_lossy().to_string(),
            ..WatchConfig::default()
        },
        max_upload_size: 5 * 1024 * 1024,
    };

    Arc::new(AppState::new(config, store))
}
