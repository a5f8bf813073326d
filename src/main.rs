use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_uploader::{
    api,
    config::{Config, StorageBackend},
    object_store as obj,
    upload::{LogObserver, WatchHandle, WatchReactor},
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "image-uploader starting");

    // Load configuration
    let config = Config::load()?;

    // Initialize object store backend
    let object_store: Arc<dyn obj::ObjectStore> = match config.storage.backend {
        StorageBackend::Local => {
            let store = obj::LocalStore::new(&config.storage.local_storage_path)?;
            info!(
                "Using local storage backend at: {}",
                config.storage.local_storage_path
            );
            Arc::new(store)
        }
        StorageBackend::S3 => {
            let store = obj::S3Store::new(&config.storage.s3).await?;
            info!(
                bucket = %config.storage.s3.bucket,
                region = %config.storage.s3.region,
                "Using S3 storage backend"
            );
            Arc::new(store)
        }
    };

    // Create shared state
    let state = Arc::new(AppState::new(config.clone(), object_store));

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    // Startup scan, then watch for new arrivals
    let auto_upload = tokio::spawn(start_auto_upload(Arc::clone(&state)));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup: stop the watcher
    info!("Shutting down background tasks");
    if !auto_upload.is_finished() {
        auto_upload.abort();
    }
    match auto_upload.await {
        Ok(Some(handle)) => handle.abort(),
        Ok(None) => {}
        Err(e) if e.is_cancelled() => {}
        Err(e) => error!(error = %e, "Auto-upload task failed"),
    }

    info!("Shutdown complete");
    Ok(())
}

async fn start_auto_upload(state: Arc<AppState>) -> Option<WatchHandle> {
    let watch = &state.config.watch;

    if watch.scan_on_startup {
        if let Err(e) = state.reconciler.reconcile_all().await {
            error!(error = %e, "Startup scan failed");
        }
    }

    if !watch.enabled {
        info!("File watcher disabled");
        return None;
    }

    let reactor = WatchReactor::new(
        Arc::clone(&state.uploader),
        Duration::from_millis(watch.upload_delay_ms),
        Arc::new(LogObserver),
    );
    match reactor.spawn(&watch.directory) {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!(error = %e, directory = %watch.directory, "Failed to start file watcher");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
