use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{ObjectStore, ObjectStoreError};
use crate::config::S3Config;

/// S3-compatible object store (AWS S3, DigitalOcean Spaces, MinIO).
pub struct S3Store {
    bucket: String,
    client: Client,
    public_base_url: String,
}

impl S3Store {
    pub async fn new(config: &S3Config) -> Result<Self, anyhow::Error> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "image-uploader-env",
            ));
        }

        let sdk_config = loader.load().await;
        let mut builder = S3ConfigBuilder::from(&sdk_config);
        if let Some(ref endpoint) = config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Ok(Self {
            bucket: config.bucket.clone(),
            client: Client::from_conf(builder.build()),
            public_base_url: public_base_url(config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), ObjectStoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

/// `https://<bucket>.<region>.<domain>` unless an explicit base is configured.
fn public_base_url(config: &S3Config) -> String {
    match config.public_base_url {
        Some(ref base) => base.trim_end_matches('/').to_string(),
        None => format!(
            "https://{}.{}.{}",
            config.bucket, config.region, config.public_domain
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_base_url_derived() {
        let config = S3Config {
            bucket: "media".to_string(),
            region: "nyc3".to_string(),
            ..Default::default()
        };
        assert_eq!(
            public_base_url(&config),
            "https://media.nyc3.digitaloceanspaces.com"
        );
    }

    #[test]
    fn test_public_base_url_override() {
        let config = S3Config {
            bucket: "media".to_string(),
            public_base_url: Some("https://cdn.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(public_base_url(&config), "https://cdn.example.com");
    }

    #[tokio::test]
    async fn test_public_url_joins_key() {
        let config = S3Config {
            access_key: Some("key".to_string()),
            bucket: "media".to_string(),
            endpoint: Some("https://nyc3.digitaloceanspaces.com".to_string()),
            region: "nyc3".to_string(),
            secret_key: Some("secret".to_string()),
            ..Default::default()
        };
        let store = S3Store::new(&config).await.unwrap();
        assert_eq!(
            store.public_url("tmp/uploads/a.png"),
            "https://media.nyc3.digitaloceanspaces.com/tmp/uploads/a.png"
        );
    }
}
