//! Traits and types for creating pre-signed urls.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod hmac;
pub mod noop;
pub mod s3;

/// Trait implemented by object store clients to derive a pre-signed url
/// from an object key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Create a presigned url for an object key.
    async fn sign_url(&self, key: &str) -> Result<SignedUrl, SignerError>;
}

/// A presigned url with a validity period.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedUrl {
    url: String,
    valid_from: DateTime<Utc>,
    valid_duration: Duration,
}

impl SignedUrl {
    /// Create a new signed url.
    pub fn new(url: String, valid_from: DateTime<Utc>, valid_duration: Duration) -> Self {
        Self {
            url,
            valid_from,
            valid_duration,
        }
    }

    /// Get the presigned url.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the time the presigned url was issued.
    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    /// Get the time the presigned url expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.valid_from + self.valid_duration
    }

    /// Whether the url is expired at the given instant.
    pub fn is_expired_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.expires_at()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignerErrorKind {
    /// The requested object is absent or not allow-listed.
    ObjectNotFound,
    /// The signing credential could not be loaded.
    CredentialUnavailable,
    /// Any other signing failure.
    Internal,
}

/// Errors that can occur while producing a signed url.
#[derive(Debug, Clone, PartialEq)]
pub struct SignerError {
    kind: SignerErrorKind,
    message: String,
}

impl SignerError {
    pub fn new(kind: SignerErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> SignerErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn object_not_found(message: impl Into<String>) -> Self {
        Self::new(SignerErrorKind::ObjectNotFound, message)
    }

    pub fn credential_unavailable(message: impl Into<String>) -> Self {
        Self::new(SignerErrorKind::CredentialUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SignerErrorKind::Internal, message)
    }
}

impl Display for SignerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SignerError {}
