use anyhow::Result;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use std::sync::Arc;

use super::Provider;
use crate::config::MountConfig;
use crate::remote::{RemoteStore, S3Store};

const DEFAULT_REGION: &str = "us-east-1";

/// Amazon S3 or an S3-compatible service
pub struct S3Provider;

impl Default for S3Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl S3Provider {
    pub fn new() -> Self {
        Self
    }
}

/// Build an S3 client from the mount configuration.
///
/// A custom endpoint switches to path-style addressing, which most
/// S3-compatible services require.
pub async fn create_s3_client(config: &MountConfig) -> Client {
    let base_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;

    let region = config
        .region
        .clone()
        .or_else(|| base_config.region().map(|r| r.as_ref().to_string()))
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let mut s3_config_builder =
        aws_sdk_s3::config::Builder::from(&base_config).region(Region::new(region));

    if let Some(endpoint) = &config.endpoint_url {
        s3_config_builder = s3_config_builder
            .endpoint_url(endpoint)
            .force_path_style(true);
    }

    Client::from_conf(s3_config_builder.build())
}

#[async_trait::async_trait]
impl Provider for S3Provider {
    fn name(&self) -> &str {
        "s3"
    }

    fn description(&self) -> &str {
        "Amazon S3 or S3-compatible bucket"
    }

    async fn create_store(&self, config: &MountConfig) -> Result<Arc<dyn RemoteStore>> {
        config.validate()?;
        let bucket = config.bucket.clone().unwrap_or_default();
        let client = create_s3_client(config).await;
        Ok(Arc::new(S3Store::new(client, bucket)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_s3_provider_requires_bucket() {
        let provider = S3Provider::new();
        assert_eq!(provider.name(), "s3");
        assert_eq!(provider.description(), "Amazon S3 or S3-compatible bucket");

        let mut config = MountConfig::new("/content/s3", "");
        config.provider = "s3".to_string();
        let err = provider.create_store(&config).await.err().unwrap();
        assert!(err.to_string().contains("bucket"));
    }
}
