//! Uploads images that appear in the watch directory after subscription.
//!
//! Files already present when the watcher starts are left to the reconciler.
//! Each new image is uploaded once, after a fixed delay that gives the writer
//! time to finish; the outcome goes to the injected [`UploadObserver`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::classify::is_image_file;
use super::executor::Uploader;
use super::observer::UploadObserver;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Watcher error: {0}")]
    Notify(#[from] notify::Error),
}

pub struct WatchReactor {
    delay: Duration,
    observer: Arc<dyn UploadObserver>,
    uploader: Arc<Uploader>,
}

/// Keeps the OS watcher alive. Dropping it stops event delivery.
pub struct WatchHandle {
    directory: PathBuf,
    task: JoinHandle<()>,
    _watcher: RecommendedWatcher,
}

impl WatchHandle {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn abort(self) {
        self.task.abort();
    }
}

impl WatchReactor {
    pub fn new(
        uploader: Arc<Uploader>,
        delay: Duration,
        observer: Arc<dyn UploadObserver>,
    ) -> Self {
        Self {
            delay,
            observer,
            uploader,
        }
    }

    /// Subscribe to `directory` (created if absent) and start reacting to new files.
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, directory: impl AsRef<Path>) -> Result<WatchHandle, WatchError> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&directory, RecursiveMode::Recursive)?;

        info!(directory = %directory.display(), "File watcher ready");

        let reactor = Arc::new(self);
        let task = tokio::spawn(async move {
            while let Some(res) = rx.recv().await {
                match res {
                    Ok(event) => {
                        for path in new_image_paths(&event) {
                            reactor.schedule(path);
                        }
                    }
                    Err(e) => error!(error = %e, "File watcher error"),
                }
            }
            debug!("File watcher channel closed");
        });

        Ok(WatchHandle {
            directory,
            task,
            _watcher: watcher,
        })
    }

    fn schedule(self: &Arc<Self>, path: PathBuf) {
        let Some(name) = file_name(&path) else {
            return;
        };
        info!(file = %name, "New image detected");

        let reactor = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(reactor.delay).await;
            let result = reactor.uploader.upload_file(&path, &name).await;
            reactor.observer.upload_finished(&path, &result);
        });
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}

/// Paths of eligible, non-hidden images an event announces as newly added.
fn new_image_paths(event: &Event) -> Vec<PathBuf> {
    // FSEvents reports both ends of a rename as `Any`; only the side that
    // still exists as a file is an arrival.
    let needs_file_check = match event.kind {
        EventKind::Create(CreateKind::Folder) => return Vec::new(),
        EventKind::Create(_) => false,
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => false,
        EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => true,
        _ => return Vec::new(),
    };

    event
        .paths
        .iter()
        .filter(|path| {
            file_name(path).is_some_and(|name| !name.starts_with('.') && is_image_file(&name))
        })
        .filter(|path| !needs_file_check || path.is_file())
        .cloned()
        .collect()
}
