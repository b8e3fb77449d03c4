//! Per-request redirect resolution at the distribution edge.
//!
//! Every viewer request passes through [`EdgeRedirect`] exactly once before
//! the cache and origin logic. Requests that already carry a signed query
//! are forwarded untouched; anything else is answered with a `302` pointing
//! at the same path with the signed query attached. The signer endpoint is
//! resolved from the parameter store through a short-lived local cache so
//! the external lookup does not happen on every request.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::ServerError;
use crate::params::{ParameterStore, REDIRECT_TARGET_PARAMETER};

/// Viewer request as seen by the edge step.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerRequest {
    uri: String,
    querystring: String,
}

impl ViewerRequest {
    /// Create a new viewer request from a path and raw query string.
    pub fn new(uri: impl Into<String>, querystring: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            querystring: querystring.into(),
        }
    }

    /// Request path.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Raw query string, without the leading `?`.
    pub fn querystring(&self) -> &str {
        &self.querystring
    }

    /// Whether the query string already carries signing parameters.
    pub fn is_presigned(&self) -> bool {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(&self.querystring).unwrap_or_default();
        pairs
            .iter()
            .any(|(name, _)| name == "X-Amz-Credential" || name == "X-Amz-Signature")
    }
}

/// Outcome of the edge redirect step.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeOutcome {
    /// Continue to cache/origin with the request unchanged.
    Forward(ViewerRequest),
    /// Answer the viewer with a redirect to the given location.
    Redirect {
        /// Value of the `Location` header.
        location: String,
    },
}

/// Timing configuration for the edge step.
#[derive(Debug, Clone, Copy)]
pub struct EdgeConfig {
    /// Validity of the locally cached signer endpoint. Must stay well
    /// below the validity of the signed urls themselves.
    pub endpoint_cache_ttl: Duration,
    /// Upper bound for any external call made during resolution.
    pub call_timeout: Duration,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            endpoint_cache_ttl: Duration::from_secs(60),
            call_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Deserialize)]
struct PresignedUrlBody {
    presigned_url: String,
}

/// The edge redirect step.
pub struct EdgeRedirect {
    params: Arc<dyn ParameterStore>,
    http: reqwest::Client,
    config: EdgeConfig,
    cached_endpoint: Mutex<Option<(String, Instant)>>,
}

impl EdgeRedirect {
    /// Create a new edge redirect step reading the signer endpoint from
    /// the given parameter store.
    pub fn new(params: Arc<dyn ParameterStore>, config: EdgeConfig) -> Result<Self, ServerError> {
        let http = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .build()
            .map_err(|e| ServerError::internal(e.to_string()))?;
        Ok(Self {
            params,
            http,
            config,
            cached_endpoint: Mutex::new(None),
        })
    }

    /// Resolve a viewer request to an edge outcome.
    ///
    /// Any failure along the way (missing redirect target, signer call
    /// timeout, malformed signer response) is a gateway error; a broken
    /// redirect is never returned.
    pub async fn resolve(&self, request: ViewerRequest) -> Result<EdgeOutcome, ServerError> {
        if request.is_presigned() {
            tracing::debug!(uri = %request.uri(), "request already signed, forwarding");
            return Ok(EdgeOutcome::Forward(request));
        }

        let endpoint = self.signer_endpoint().await?;
        let presigned_url = self.fetch_presigned_url(&endpoint, request.uri()).await?;

        let signed_query = presigned_url
            .split_once('?')
            .map(|(_, query)| query)
            .ok_or_else(|| {
                ServerError::gateway("signer returned a url without a signed query")
            })?;

        let location = format!("{}?{}", request.uri(), signed_query);
        tracing::info!(uri = %request.uri(), "redirecting to signed url");
        Ok(EdgeOutcome::Redirect { location })
    }

    /// Resolve the signer endpoint, consulting the local cache first.
    async fn signer_endpoint(&self) -> Result<String, ServerError> {
        {
            let cached = self.cached_endpoint.lock().expect("endpoint cache poisoned");
            if let Some((endpoint, fetched_at)) = cached.as_ref() {
                if fetched_at.elapsed() < self.config.endpoint_cache_ttl {
                    return Ok(endpoint.clone());
                }
            }
        }

        let lookup = self.params.get_parameter(REDIRECT_TARGET_PARAMETER);
        let endpoint = tokio::time::timeout(self.config.call_timeout, lookup)
            .await
            .map_err(|_| ServerError::gateway("timed out resolving the redirect target"))??;

        let mut cached = self.cached_endpoint.lock().expect("endpoint cache poisoned");
        *cached = Some((endpoint.clone(), Instant::now()));
        Ok(endpoint)
    }

    async fn fetch_presigned_url(&self, endpoint: &str, uri: &str) -> Result<String, ServerError> {
        let response = self
            .http
            .get(endpoint)
            .query(&[("uri", uri)])
            .send()
            .await
            .map_err(|e| ServerError::gateway(format!("signer call failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServerError::gateway(format!(
                "signer answered with status {}",
                response.status()
            )));
        }

        let body: PresignedUrlBody = response
            .json()
            .await
            .map_err(|e| ServerError::gateway(format!("malformed signer response: {}", e)))?;
        Ok(body.presigned_url)
    }
}
