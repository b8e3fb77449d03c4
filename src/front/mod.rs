//! The viewer-facing distribution front.
//!
//! A request travels `Received -> EdgeRedirectInvoked -> {CacheHit |
//! OriginFetched | Failed} -> ResponseReturned`. The edge redirect step
//! runs exactly once per request, before any cache or origin work.
//! Successful origin responses are cached keyed by path plus full query
//! string; error responses and redirects are never cached.

use std::fmt::Display;
use std::sync::Arc;

use axum::http::StatusCode;
use bytes::Bytes;
use url::Url;

use async_trait::async_trait;

use crate::edge::{EdgeOutcome, EdgeRedirect, ViewerRequest};

pub mod cache;

pub use cache::{CachePolicy, CachedResponse, ResponseCache};

/// A response fetched from the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginResponse {
    /// Origin status code.
    pub status: StatusCode,
    /// Origin content type, if any.
    pub content_type: Option<String>,
    /// Origin cache directive, if any.
    pub cache_control: Option<String>,
    /// Response body.
    pub body: Bytes,
}

/// Error reaching the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginError {
    message: String,
}

impl OriginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for OriginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "origin fetch failed: {}", self.message)
    }
}

impl std::error::Error for OriginError {}

/// Trait implemented by origin clients.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    /// Fetch the given url from the origin.
    async fn fetch(&self, url: &Url) -> Result<OriginResponse, OriginError>;
}

/// Protocol policy applied to origin fetches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OriginProtocolPolicy {
    /// Only `https` origin urls are allowed.
    HttpsOnly,
    /// Plain `http` is allowed. Intended for local testing only.
    AllowHttp,
}

impl OriginProtocolPolicy {
    /// Scheme to use when building origin urls under this policy.
    pub fn origin_scheme(&self) -> &'static str {
        match self {
            Self::HttpsOnly => "https",
            Self::AllowHttp => "http",
        }
    }
}

/// Origin client over HTTP.
pub struct HttpOriginFetcher {
    client: reqwest::Client,
    policy: OriginProtocolPolicy,
}

impl HttpOriginFetcher {
    /// Create a new HTTPS-only origin client.
    pub fn new() -> Result<Self, OriginError> {
        Self::with_policy(OriginProtocolPolicy::HttpsOnly)
    }

    /// Create a new origin client with an explicit protocol policy.
    pub fn with_policy(policy: OriginProtocolPolicy) -> Result<Self, OriginError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| OriginError::new(e.to_string()))?;
        Ok(Self { client, policy })
    }
}

#[async_trait]
impl OriginFetcher for HttpOriginFetcher {
    async fn fetch(&self, url: &Url) -> Result<OriginResponse, OriginError> {
        if self.policy == OriginProtocolPolicy::HttpsOnly && url.scheme() != "https" {
            return Err(OriginError::new(format!(
                "origin protocol policy forbids `{}` urls",
                url.scheme()
            )));
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| OriginError::new(e.to_string()))?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| OriginError::new(e.to_string()))?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let cache_control = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response
            .bytes()
            .await
            .map_err(|e| OriginError::new(e.to_string()))?;

        Ok(OriginResponse {
            status,
            content_type,
            cache_control,
            body,
        })
    }
}

/// Terminal state of a handled viewer request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RequestOutcome {
    /// Served from the response cache.
    CacheHit,
    /// Served from a fresh origin fetch.
    OriginFetched,
    /// Answered with a redirect synthesized at the edge.
    Redirected,
    /// An error response was surfaced to the viewer.
    Failed,
}

/// Response returned to the viewer, along with how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontResponse {
    /// Response status.
    pub status: StatusCode,
    /// Content type, if any.
    pub content_type: Option<String>,
    /// Redirect location, for `Redirected` outcomes.
    pub location: Option<String>,
    /// Response body.
    pub body: Bytes,
    /// Terminal state the request reached.
    pub outcome: RequestOutcome,
}

impl FrontResponse {
    fn redirect(location: String) -> Self {
        Self {
            status: StatusCode::FOUND,
            content_type: None,
            location: Some(location),
            body: Bytes::new(),
            outcome: RequestOutcome::Redirected,
        }
    }

    fn failed(status: StatusCode, message: String) -> Self {
        Self {
            status,
            content_type: Some("application/json; charset=utf-8".to_string()),
            location: None,
            body: Bytes::from(message),
            outcome: RequestOutcome::Failed,
        }
    }

    fn from_cached(response: CachedResponse, outcome: RequestOutcome) -> Self {
        Self {
            status: response.status,
            content_type: response.content_type,
            location: None,
            body: response.body,
            outcome,
        }
    }
}

/// The distribution front.
pub struct DistributionFront {
    edge: EdgeRedirect,
    origin: Arc<dyn OriginFetcher>,
    origin_base: Url,
    cache: ResponseCache,
    policy: CachePolicy,
}

impl DistributionFront {
    /// Create a new distribution front serving the given origin.
    pub fn new(edge: EdgeRedirect, origin: Arc<dyn OriginFetcher>, origin_base: Url) -> Self {
        Self {
            edge,
            origin,
            origin_base,
            cache: ResponseCache::new(),
            policy: CachePolicy::default(),
        }
    }

    /// Override the cache TTL policy.
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Handle one viewer request end to end.
    ///
    /// This never returns an error: every failure is turned into an error
    /// response so the viewer always receives a terminal answer.
    pub async fn handle(&self, request: ViewerRequest) -> FrontResponse {
        tracing::debug!(uri = %request.uri(), "request received");

        let forwarded = match self.edge.resolve(request).await {
            Ok(EdgeOutcome::Redirect { location }) => {
                return FrontResponse::redirect(location);
            }
            Ok(EdgeOutcome::Forward(request)) => request,
            Err(err) => {
                tracing::warn!(error = %err, "edge redirect failed");
                return FrontResponse::failed(
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({
                        "errorCode": "GATEWAY_ERROR",
                        "message": err.message(),
                    })
                    .to_string(),
                );
            }
        };

        let cache_key = format!("{}?{}", forwarded.uri(), forwarded.querystring());
        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!(key = %cache_key, "cache hit");
            return FrontResponse::from_cached(cached, RequestOutcome::CacheHit);
        }

        let origin_url = match self.origin_url(&forwarded) {
            Ok(url) => url,
            Err(err) => {
                return FrontResponse::failed(
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({
                        "errorCode": "GATEWAY_ERROR",
                        "message": err.to_string(),
                    })
                    .to_string(),
                )
            }
        };

        match self.origin.fetch(&origin_url).await {
            Ok(response) => {
                let cached = CachedResponse {
                    status: response.status,
                    content_type: response.content_type,
                    body: response.body,
                };
                if response.status.is_success() {
                    let ttl = self.policy.ttl_for(response.cache_control.as_deref());
                    self.cache.put(&cache_key, cached.clone(), ttl);
                    tracing::debug!(key = %cache_key, ttl_secs = ttl.as_secs(), "origin response cached");
                } else {
                    tracing::debug!(key = %cache_key, status = %response.status, "origin error, cache bypassed");
                }
                FrontResponse::from_cached(cached, RequestOutcome::OriginFetched)
            }
            Err(err) => {
                tracing::warn!(error = %err, "origin fetch failed");
                FrontResponse::failed(
                    StatusCode::BAD_GATEWAY,
                    serde_json::json!({
                        "errorCode": "GATEWAY_ERROR",
                        "message": err.to_string(),
                    })
                    .to_string(),
                )
            }
        }
    }

    fn origin_url(&self, request: &ViewerRequest) -> Result<Url, OriginError> {
        let mut url = self
            .origin_base
            .join(request.uri().trim_start_matches('/'))
            .map_err(|e| OriginError::new(e.to_string()))?;
        if !request.querystring().is_empty() {
            url.set_query(Some(request.querystring()));
        }
        Ok(url)
    }
}
