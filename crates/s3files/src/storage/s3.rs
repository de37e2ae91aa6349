// ai
//! 🪣📡 S3 Store: the cloud-to-RAM data paratrooper.
//!
//! INT. AWS CONSOLE, NIGHT. A bucket in us-east-1 sits bloated with objects.
//! Someone typed `PUT` ten thousand times and walked away. The objects have been
//! waiting. Patient. Ready to be pulled down by a Rust process, a handful at a time.
//!
//! This module wraps the AWS S3 SDK behind [`ObjectStore`]. Config lives right here,
//! next to the thing it configures, so nobody goes on a 2am scavenger hunt for it.
//!
//! 🧠 Knowledge graph:
//! - `StorageConfig`: bucket, region, optional endpoint override, path-style toggle
//! - `S3Store::from_config`: aws-config default credential chain + region → `aws_sdk_s3::Client`
//! - `S3Store::from_client`: bring your own client (tests, custom middleware, exotic auth)
//! - Transport: `GetObject` → `ByteStream::into_async_read()` → boxed `AsyncRead`
//!
//! ⚠️ Credentials are whatever the default chain finds. Env vars, ~/.aws, IAM role, hope.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use serde::Deserialize;
use tracing::{debug, trace};

use super::{ObjectBody, ObjectStore};

// ============================================================
//  🔧 StorageConfig: where the bucket is and how to knock on its door
// ============================================================

/// 🔧 Connection settings for the storage backend.
///
/// `bucket` is required for fetching, but defaults to empty so a config without one still
/// parses; the pipeline then refuses to start, loudly, instead of serde refusing, cryptically.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageConfig {
    /// 🪣 The bucket name: where the data lives, sleeps, and waits for us
    #[serde(default)]
    pub bucket: String,
    /// 🌎 AWS region. Defaults to "us-east-1" because that's where data goes to retire
    #[serde(default = "default_s3_region")]
    pub region: String,
    /// 🔀 Optional endpoint override for S3-compatible stores (MinIO, R2, localstack...)
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// 🛣️ Path-style addressing (`host/bucket/key`). Most S3-compatibles want this on.
    #[serde(default)]
    pub force_path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_s3_region(),
            endpoint_url: None,
            force_path_style: false,
        }
    }
}

/// 🌎 Default region: us-east-1. The Florida of AWS regions. Everyone ends up there eventually.
pub(crate) fn default_s3_region() -> String {
    "us-east-1".to_string()
}

// ============================================================
//  🪣 S3Store: GetObject, but make it a trait object
// ============================================================

/// 🪣 [`ObjectStore`] backed by `aws_sdk_s3::Client`.
///
/// Cloning is cheap; the SDK client is an `Arc` on the inside.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
}

impl S3Store {
    /// 🚀 Build an S3 client from region / endpoint settings and the default credential chain.
    ///
    /// Never fails by itself: the SDK defers credential resolution to the first request,
    /// so a bad setup shows up as per-key fetch errors. Which is exactly where we want it.
    pub async fn from_config(config: &StorageConfig) -> Self {
        debug!(
            "🔧 building S3 client: region={}, endpoint={:?}, path_style={}",
            config.region, config.endpoint_url, config.force_path_style
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let the_aws_config = loader.load().await;

        let the_s3_config = aws_sdk_s3::config::Builder::from(&the_aws_config)
            .force_path_style(config.force_path_style)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(the_s3_config),
        }
    }

    /// 🔌 Wrap an already-built SDK client. Dependency injection, the respectable way.
    pub fn from_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        trace!("📡 GetObject s3://{}/{}", bucket, key);

        let the_response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)
            .with_context(|| {
                format!(
                    "💀 GetObject failed for s3://{bucket}/{key}. \
                     Check: bucket name, key path, region, and credentials."
                )
            })?;

        // 🔗 ByteStream → AsyncRead. Stream errors mid-transfer surface as io::Error on read.
        Ok(Box::new(the_response.body.into_async_read()))
    }
}
