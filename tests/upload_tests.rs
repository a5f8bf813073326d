use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use image_uploader::object_store::LocalStore;
use image_uploader::upload::{
    Reconciler, UploadObserver, UploadResult, UploadSummary, Uploader, WatchReactor,
};

fn local_uploader(store_dir: &Path) -> (Arc<LocalStore>, Arc<Uploader>) {
    let store = Arc::new(LocalStore::new(store_dir).unwrap());
    let uploader = Arc::new(Uploader::new(store.clone(), "tmp/uploads"));
    (store, uploader)
}

#[derive(Default)]
struct Collect {
    results: Mutex<Vec<(PathBuf, UploadResult)>>,
}

impl UploadObserver for Collect {
    fn upload_finished(&self, path: &Path, result: &UploadResult) {
        self.results
            .lock()
            .unwrap()
            .push((path.to_path_buf(), result.clone()));
    }
}

#[tokio::test]
async fn test_reconcile_two_images_one_text_file() {
    let inbox = tempfile::tempdir().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    std::fs::write(inbox.path().join("one.png"), b"first image").unwrap();
    std::fs::write(inbox.path().join("two.SVG"), b"<svg/>").unwrap();
    std::fs::write(inbox.path().join("readme.txt"), b"leave me").unwrap();

    let (store, uploader) = local_uploader(bucket.path());
    let reconciler = Reconciler::new(uploader, inbox.path(), 4);

    let results = reconciler.reconcile_all().await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].original_name, "one.png");
    assert_eq!(results[1].original_name, "two.SVG");
    assert_eq!(
        UploadSummary::from_results(&results),
        UploadSummary {
            total: 2,
            successful: 2,
            failed: 0
        }
    );

    let key = results[0].key.as_deref().unwrap();
    assert!(key.starts_with("tmp/uploads/"));
    assert_eq!(std::fs::read(store.object_path(key)).unwrap(), b"first image");
    assert!(results[1].key.as_deref().unwrap().ends_with(".SVG"));

    // Sources stay where they were
    assert!(inbox.path().join("one.png").exists());
    assert!(inbox.path().join("two.SVG").exists());
    assert_eq!(
        std::fs::read(inbox.path().join("readme.txt")).unwrap(),
        b"leave me"
    );
}

#[tokio::test]
async fn test_reconcile_empty_directory() {
    let inbox = tempfile::tempdir().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    let (_store, uploader) = local_uploader(bucket.path());

    let results = Reconciler::new(uploader, inbox.path(), 1)
        .reconcile_all()
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_watcher_uploads_only_new_files() {
    let inbox = tempfile::tempdir().unwrap();
    let bucket = tempfile::tempdir().unwrap();
    std::fs::write(inbox.path().join("existing.png"), b"old").unwrap();

    let (store, uploader) = local_uploader(bucket.path());
    let observer = Arc::new(Collect::default());
    let handle = WatchReactor::new(uploader, Duration::from_millis(100), observer.clone())
        .spawn(inbox.path())
        .unwrap();

    std::fs::write(inbox.path().join("arrived.webp"), b"new").unwrap();

    for _ in 0..100 {
        if !observer.results.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    let results = observer.results.lock().unwrap().clone();
    assert_eq!(results.len(), 1);
    let (path, result) = &results[0];
    assert_eq!(path, &inbox.path().join("arrived.webp"));
    assert_eq!(result.original_name, "arrived.webp");
    let key = result.key.as_deref().unwrap();
    assert_eq!(std::fs::read(store.object_path(key)).unwrap(), b"new");

    handle.abort();
}
