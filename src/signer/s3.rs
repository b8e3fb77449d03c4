//! UrlSigner for S3 object keys.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{presigning::PresigningConfig, Client};

use super::{SignedUrl, SignerError, UrlSigner};

/// Signing configuration for the S3 object store.
pub struct S3UrlSigner {
    client: Client,
    bucket: String,
    validity: Duration,
}

impl S3UrlSigner {
    /// Create a new `S3UrlSigner` for a bucket from the provided S3 SDK
    /// client, issuing urls valid for 1 hour.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            validity: Duration::from_secs(3600),
        }
    }

    /// Override the validity period of issued urls.
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }
}

#[async_trait]
impl UrlSigner for S3UrlSigner {
    async fn sign_url(&self, key: &str) -> Result<SignedUrl, SignerError> {
        let presign_config = PresigningConfig::expires_in(self.validity)
            .map_err(|e| SignerError::internal(e.to_string()))?;
        let req = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config.clone())
            .await
            .map_err(|e| SignerError::credential_unavailable(e.to_string()))?;

        Ok(SignedUrl::new(
            req.uri().to_string(),
            presign_config.start_time().into(),
            presign_config.expires(),
        ))
    }
}
