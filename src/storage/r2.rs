use anyhow::{Context as AnyhowContext, Result};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use tracing::{debug, error, info, instrument};

use super::{join_public_url, ObjectStore};
use crate::config::CloudflareConfig;
use crate::errors::AppError;

/// Cloudflare R2 client for share snapshots
///
/// Uses the AWS SDK against R2's S3-compatible endpoint. Objects are written
/// once under random keys and never deleted.
#[derive(Clone)]
pub struct R2Client {
    client: Client,
    bucket: String,
    public_base_url: String,
    account_id: String,
}

impl R2Client {
    /// Create a new R2 client
    ///
    /// # Errors
    /// Returns error if any of the R2 credentials is missing
    #[instrument(skip(config), fields(bucket = %config.r2_bucket_snapshots))]
    pub fn new(config: &CloudflareConfig) -> Result<Self> {
        let account_id = config
            .account_id
            .as_ref()
            .context("CLOUDFLARE_ACCOUNT_ID is required for R2 operations")?;

        let access_key_id = config
            .r2_access_key_id
            .as_ref()
            .context("CLOUDFLARE_R2_ACCESS_KEY_ID is required for R2 operations")?;

        let secret_access_key = config
            .r2_secret_access_key
            .as_ref()
            .context("CLOUDFLARE_R2_SECRET_ACCESS_KEY is required for R2 operations")?;

        // R2 endpoint format: https://<account_id>.r2.cloudflarestorage.com
        let endpoint_url = config
            .r2_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}.r2.cloudflarestorage.com", account_id));

        debug!(endpoint = %endpoint_url, "Initializing R2 client");

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None, // session token (not needed for R2)
            None, // expiration (static credentials)
            "r2",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&endpoint_url)
            .region(Region::new("auto")) // R2 uses "auto" region
            .credentials_provider(credentials)
            .force_path_style(false)
            .build();

        let client = Client::from_conf(s3_config);

        info!(
            account_id = %account_id,
            bucket = %config.r2_bucket_snapshots,
            public_base_url = %config.r2_public_base_url,
            "R2 client initialized successfully"
        );

        Ok(Self {
            client,
            bucket: config.r2_bucket_snapshots.clone(),
            public_base_url: config.r2_public_base_url.clone(),
            account_id: account_id.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for R2Client {
    #[instrument(skip(self, bytes), fields(account_id = %self.account_id, bucket = %self.bucket, size_bytes = bytes.len()))]
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                error!(
                    error = ?e,
                    bucket = %self.bucket,
                    key = %key,
                    "Failed to upload object to R2"
                );
                AppError::Storage(format!("Failed to upload object to R2: {}", e))
            })?;

        info!(bucket = %self.bucket, key = %key, "Uploaded object to R2");

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CloudflareConfig {
        CloudflareConfig {
            account_id: Some("acct".to_string()),
            r2_endpoint: None,
            r2_access_key_id: Some("key".to_string()),
            r2_secret_access_key: Some("secret".to_string()),
            r2_bucket_snapshots: "snapshots".to_string(),
            r2_public_base_url: "https://pub-test.r2.dev".to_string(),
        }
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut config = config();
        config.r2_secret_access_key = None;
        let err = R2Client::new(&config).err().unwrap();
        assert!(err.to_string().contains("CLOUDFLARE_R2_SECRET_ACCESS_KEY"));
    }

    #[test]
    fn test_public_url_is_deterministic() {
        let client = R2Client::new(&config()).unwrap();
        assert_eq!(client.bucket(), "snapshots");
        assert_eq!(
            client.public_url("abc.png"),
            "https://pub-test.r2.dev/abc.png"
        );
    }
}
