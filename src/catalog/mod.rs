//! Types and traits for the object allow-list.
//!
//! The signer only issues URLs for objects it can account for. The catalog
//! answers whether a requested key is part of the signed asset set, either
//! from a static configuration file or by probing the backing store.

use std::{error::Error, fmt::Display};

use async_trait::async_trait;

pub mod file;
pub mod s3;

/// Trait implemented by allow-list backends for the signed asset set.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectCatalog: Send + Sync {
    /// Check whether the given object key may be signed.
    async fn contains(&self, key: &str) -> Result<bool, CatalogError>;
}

/// Errors that can occur while consulting the allow-list.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog source could not be read or reached.
    ConnectionError {
        /// Reason why the source was unavailable.
        reason: String,
    },
    /// Other error
    Other {
        /// Reason why this error occurred.
        reason: String,
    },
}

impl CatalogError {
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::ConnectionError {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Other {
            reason: reason.into(),
        }
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::ConnectionError { reason } => {
                write!(f, "could not reach the object catalog: {}", reason)
            }
            CatalogError::Other { reason } => {
                write!(f, "object catalog error: {}", reason)
            }
        }
    }
}

impl Error for CatalogError {}
