//! Allow-list backed by the object store itself.

use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::Client;

use super::{CatalogError, ObjectCatalog};

/// Catalog that treats every object present in the bucket as signable.
///
/// Membership is a `HeadObject` probe; a 404 means the key is not part of
/// the asset set, any other failure is surfaced as a catalog error.
pub struct S3Catalog {
    client: Client,
    bucket: String,
}

impl S3Catalog {
    /// Create a new catalog for the given bucket.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectCatalog for S3Catalog {
    async fn contains(&self, key: &str) -> Result<bool, CatalogError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(err)) if err.err().is_not_found() => Ok(false),
            Err(e) => Err(CatalogError::connection(e.to_string())),
        }
    }
}
