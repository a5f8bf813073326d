//! The upload workflow: which files get uploaded, under which key, and what
//! happens when the backend refuses them.

pub mod classify;
mod executor;
pub mod naming;
mod observer;
mod reconciler;
mod watcher;

pub use executor::{UploadResult, Uploader};
pub use observer::{LogObserver, UploadObserver};
pub use reconciler::{FirstUpload, ReconcileError, Reconciler, UploadSummary};
pub use watcher::{WatchError, WatchHandle, WatchReactor};
