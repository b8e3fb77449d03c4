//! Deployment configuration for both service units.
//!
//! Values that cross the deployment boundary (bucket name, bucket region,
//! signer endpoint) are plain strings handed from the signer deployment to
//! the gateway deployment. They are validated eagerly: a missing or empty
//! value is a fatal error raised before the server binds a socket.

use std::env;
use std::fmt::Display;
use std::time::Duration;

/// Environment variable carrying the object store bucket name.
pub const ENV_BUCKET_NAME: &str = "CDK_S3_BUCKET_NAME";
/// Environment variable carrying the object store region.
pub const ENV_BUCKET_REGION: &str = "CDK_S3_BUCKET_REGION";
/// Environment variable carrying the signer service endpoint.
pub const ENV_SIGNER_URL: &str = "CDK_PRESIGNED_URL";

/// Values produced by deploying the signer unit and consumed by the
/// gateway unit.
#[derive(Debug, Clone, PartialEq)]
pub struct HandoffConfig {
    bucket_name: String,
    bucket_region: String,
    signer_url: String,
}

impl HandoffConfig {
    /// Create a hand-off configuration from explicit values.
    pub fn new(
        bucket_name: impl Into<String>,
        bucket_region: impl Into<String>,
        signer_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            bucket_name: bucket_name.into(),
            bucket_region: bucket_region.into(),
            signer_url: signer_url.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read the hand-off configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the hand-off configuration through a custom lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            bucket_name: lookup(ENV_BUCKET_NAME).unwrap_or_default(),
            bucket_region: lookup(ENV_BUCKET_REGION).unwrap_or_default(),
            signer_url: lookup(ENV_SIGNER_URL).unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_name.is_empty() {
            return Err(ConfigError::missing(ENV_BUCKET_NAME));
        }
        if self.bucket_region.is_empty() {
            return Err(ConfigError::missing(ENV_BUCKET_REGION));
        }
        if self.signer_url.is_empty() {
            return Err(ConfigError::missing(ENV_SIGNER_URL));
        }
        Ok(())
    }

    /// Name of the bucket holding the signed assets.
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Region where the bucket lives.
    pub fn bucket_region(&self) -> &str {
        &self.bucket_region
    }

    /// Endpoint of the signer service `presigned` route.
    pub fn signer_url(&self) -> &str {
        &self.signer_url
    }

    /// Virtual-hosted-style origin host for the bucket.
    pub fn origin_host(&self) -> String {
        format!("{}.s3.{}.amazonaws.com", self.bucket_name, self.bucket_region)
    }
}

/// Configuration for the signer unit itself.
#[derive(Debug, Clone)]
pub struct SignerConfig {
    bucket: String,
    default_object: String,
    url_validity: Duration,
}

impl SignerConfig {
    /// Create a signer configuration with the default URL validity (1 hour).
    pub fn new(bucket: impl Into<String>, default_object: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            default_object: default_object.into(),
            url_validity: Duration::from_secs(3600),
        }
    }

    /// Read the signer configuration from the process environment.
    ///
    /// `BUCKET` is required; `DEFAULT_OBJECT` falls back to
    /// `helloworld.html`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bucket = env::var("BUCKET").unwrap_or_default();
        if bucket.is_empty() {
            return Err(ConfigError::missing("BUCKET"));
        }
        let default_object =
            env::var("DEFAULT_OBJECT").unwrap_or_else(|_| "helloworld.html".to_string());
        Ok(Self::new(bucket, default_object))
    }

    /// Override the validity period of issued URLs.
    pub fn with_url_validity(mut self, validity: Duration) -> Self {
        self.url_validity = validity;
        self
    }

    /// Bucket the signer issues URLs for.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key used when the request does not select one.
    pub fn default_object(&self) -> &str {
        &self.default_object
    }

    /// Validity period of issued URLs.
    pub fn url_validity(&self) -> Duration {
        self.url_validity
    }
}

/// Fatal configuration error raised at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    name: String,
}

impl ConfigError {
    fn missing(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Name of the configuration value that was missing or empty.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "required configuration value `{}` is missing or empty",
            self.name
        )
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn handoff_with_all_values_succeeds() {
        let env = vars(&[
            (ENV_BUCKET_NAME, "demo-bucket"),
            (ENV_BUCKET_REGION, "us-gov-west-1"),
            (ENV_SIGNER_URL, "https://api.example.gov/presigned"),
        ]);
        let config = HandoffConfig::from_lookup(|name| env.get(name).cloned()).unwrap();

        assert_eq!(config.bucket_name(), "demo-bucket");
        assert_eq!(config.bucket_region(), "us-gov-west-1");
        assert_eq!(config.signer_url(), "https://api.example.gov/presigned");
        assert_eq!(
            config.origin_host(),
            "demo-bucket.s3.us-gov-west-1.amazonaws.com"
        );
    }

    #[test]
    fn handoff_with_missing_value_fails() {
        let env = vars(&[
            (ENV_BUCKET_NAME, "demo-bucket"),
            (ENV_SIGNER_URL, "https://api.example.gov/presigned"),
        ]);
        let err = HandoffConfig::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        assert_eq!(err.name(), ENV_BUCKET_REGION);
    }

    #[test]
    fn handoff_with_empty_value_fails() {
        let env = vars(&[
            (ENV_BUCKET_NAME, "demo-bucket"),
            (ENV_BUCKET_REGION, "us-gov-west-1"),
            (ENV_SIGNER_URL, ""),
        ]);
        let err = HandoffConfig::from_lookup(|name| env.get(name).cloned()).unwrap_err();
        assert_eq!(err.name(), ENV_SIGNER_URL);
    }

    #[test]
    fn handoff_reports_first_missing_value() {
        let err = HandoffConfig::from_lookup(|_| None).unwrap_err();
        assert_eq!(err.name(), ENV_BUCKET_NAME);
    }
}
