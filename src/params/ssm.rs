//! Parameter store backed by AWS Systems Manager.

use async_trait::async_trait;
use aws_sdk_ssm::error::SdkError;
use aws_sdk_ssm::Client;

use super::{ParameterStore, ParameterStoreError};

/// Parameter store reading from SSM Parameter Store.
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    /// Create a new store from the provided SSM SDK client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String, ParameterStoreError> {
        let response = self
            .client
            .get_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(err) if err.err().is_parameter_not_found() => {
                    ParameterStoreError::not_found(name)
                }
                _ => ParameterStoreError::internal(e.to_string()),
            })?;

        response
            .parameter()
            .and_then(|p| p.value())
            .map(|v| v.to_string())
            .ok_or_else(|| ParameterStoreError::not_found(name))
    }
}
