//! Traits and types for the redirect target reference store.
//!
//! The edge redirect step cannot receive per-deployment environment
//! variables, so the signer endpoint is resolved from an external
//! parameter store under a fixed, well-known name.

use std::fmt::Display;

use async_trait::async_trait;

pub mod memory;
pub mod ssm;

/// Well-known parameter name holding the signer service endpoint.
///
/// The name is fixed rather than namespaced per deployment: the edge
/// execution environment forbids injected configuration, so both the
/// deployment that writes the value and the function that reads it must
/// agree on this constant.
pub const REDIRECT_TARGET_PARAMETER: &str = "cloudfront_api_gateway_presigned_url";

/// Trait implemented by external stores of named configuration values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch the current value of a named parameter.
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterStoreErrorKind {
    /// No value is stored under the requested name.
    ParameterNotFound,
    /// The store could not be reached or answered with an error.
    Internal,
}

/// Errors that can occur while reading a parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStoreError {
    kind: ParameterStoreErrorKind,
    message: String,
}

impl ParameterStoreError {
    pub fn new(kind: ParameterStoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ParameterStoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn not_found(name: &str) -> Self {
        Self::new(
            ParameterStoreErrorKind::ParameterNotFound,
            format!("parameter `{}` not found", name),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ParameterStoreErrorKind::Internal, message)
    }
}

impl Display for ParameterStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParameterStoreError {}
