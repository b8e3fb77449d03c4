use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::{SignedUrl, SignerError, UrlSigner};

/// Signer that returns the key unchanged. Useful for wiring tests.
#[derive(Debug)]
pub struct NoopSigner;

#[async_trait]
impl UrlSigner for NoopSigner {
    async fn sign_url(&self, key: &str) -> Result<SignedUrl, SignerError> {
        Ok(SignedUrl::new(
            key.to_string(),
            Utc::now(),
            Duration::from_secs(3600),
        ))
    }
}
