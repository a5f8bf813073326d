use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub watch: WatchConfig,
    /// Maximum upload size in bytes for `POST /upload`
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Directory holding the static upload form
    pub public_dir: String,
    /// Reported by the health endpoint
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Prefix every storage key is grouped under
    pub key_prefix: String,
    /// Directory for local storage backend
    pub local_storage_path: String,
    pub s3: S3Config,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub access_key: Option<String>,
    pub bucket: String,
    /// Custom endpoint URL (DigitalOcean Spaces, MinIO, ...)
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Overrides the `https://<bucket>.<region>.<domain>` base of public URLs
    pub public_base_url: Option<String>,
    pub public_domain: String,
    pub region: String,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Local directory that is scanned and watched for new images
    pub directory: String,
    pub enabled: bool,
    /// Upper bound on uploads in flight during a directory scan
    pub scan_concurrency: usize,
    pub scan_on_startup: bool,
    /// Delay between a file appearing and its upload
    pub upload_delay_ms: u64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            access_key: None,
            bucket: String::new(),
            endpoint: None,
            force_path_style: false,
            public_base_url: None,
            public_domain: "digitaloceanspaces.com".to_string(),
            region: "us-east-1".to_string(),
            secret_key: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            key_prefix: "tmp/uploads".to_string(),
            local_storage_path: "./files".to_string(),
            s3: S3Config::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directory: "./uploads".to_string(),
            enabled: true,
            scan_concurrency: 8,
            scan_on_startup: true,
            upload_delay_ms: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| format!("0.0.0.0:{port}"));

        let public_dir = std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "./public".to_string());
        let service_name =
            std::env::var("SERVICE_NAME").unwrap_or_else(|_| "S3 Image Upload".to_string());

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5 * 1024 * 1024); // 5MB

        let backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "s3".to_string())
            .to_lowercase()
            .as_str()
        {
            "local" => StorageBackend::Local,
            _ => StorageBackend::S3,
        };

        let defaults = StorageConfig::default();
        let key_prefix = std::env::var("KEY_PREFIX").unwrap_or(defaults.key_prefix);
        let local_storage_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or(defaults.local_storage_path);

        let s3 = S3Config {
            access_key: non_empty_var("S3_ACCESS_KEY"),
            bucket: std::env::var("S3_BUCKET").unwrap_or_default(),
            endpoint: non_empty_var("S3_ENDPOINT"),
            force_path_style: flag("S3_FORCE_PATH_STYLE", false),
            public_base_url: non_empty_var("S3_PUBLIC_BASE_URL"),
            public_domain: std::env::var("S3_PUBLIC_DOMAIN").unwrap_or(defaults.s3.public_domain),
            region: std::env::var("S3_REGION").unwrap_or(defaults.s3.region),
            secret_key: non_empty_var("S3_SECRET_KEY"),
        };

        let watch_defaults = WatchConfig::default();
        let watch = WatchConfig {
            directory: std::env::var("WATCH_DIR").unwrap_or(watch_defaults.directory),
            enabled: flag("WATCH_ENABLED", watch_defaults.enabled),
            scan_concurrency: std::env::var("SCAN_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(watch_defaults.scan_concurrency),
            scan_on_startup: flag("SCAN_ON_STARTUP", watch_defaults.scan_on_startup),
            upload_delay_ms: std::env::var("WATCH_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(watch_defaults.upload_delay_ms),
        };

        let config = Config {
            server: ServerConfig {
                bind_address,
                public_dir,
                service_name,
            },
            storage: StorageConfig {
                backend,
                key_prefix,
                local_storage_path,
                s3,
            },
            watch,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.watch.scan_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "SCAN_CONCURRENCY must be greater than 0".to_string(),
            ));
        }

        // Missing credentials are not fatal: uploads fail and report the backend error.
        if self.storage.backend == StorageBackend::S3 {
            if self.storage.s3.bucket.is_empty() {
                tracing::warn!("S3_BUCKET is not set; uploads will fail until it is configured");
            }
            if self.storage.s3.access_key.is_none() || self.storage.s3.secret_key.is_none() {
                tracing::warn!(
                    "S3_ACCESS_KEY/S3_SECRET_KEY not set; falling back to the default AWS credential chain"
                );
            }
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}
