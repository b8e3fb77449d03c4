//! Authentication middleware checking a shared API key.

use std::future::{ready, Future};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::auth::ClientId;
use crate::error::ServerError;

/// Authentication middleware.
///
/// Requests must carry `Authorization: Bearer <key>` with the configured
/// shared key; anything else is rejected with an unauthorized response.
#[derive(Debug, Clone)]
pub struct ApiKeyAuthLayer {
    key: String,
}

impl ApiKeyAuthLayer {
    /// Create a new layer checking against the given shared key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl<S> Layer<S> for ApiKeyAuthLayer {
    type Service = ApiKeyAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuth {
            inner,
            key: self.key.clone(),
        }
    }
}

/// Service produced by [`ApiKeyAuthLayer`].
#[derive(Debug, Clone)]
pub struct ApiKeyAuth<S> {
    inner: S,
    key: String,
}

impl<S> ApiKeyAuth<S> {
    fn is_authorized(&self, req: &Request) -> bool {
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| token == self.key)
    }
}

impl<S> Service<Request> for ApiKeyAuth<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        if !self.is_authorized(&req) {
            tracing::warn!("rejecting request without a valid api key");
            let response = ServerError::unauthorized("missing or invalid api key").into_response();
            return Box::pin(ready(Ok(response)));
        }

        let client_id = ClientId::known("api-key");
        req.extensions_mut().insert(client_id);
        Box::pin(self.inner.call(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http::{Request as HttpRequest, StatusCode};
    use tower::{BoxError, ServiceBuilder, ServiceExt};

    async fn check_client(req: HttpRequest<Body>) -> Result<Response, BoxError> {
        assert_eq!(
            req.extensions().get::<ClientId>(),
            Some(&ClientId::known("api-key"))
        );
        Ok(StatusCode::OK.into_response())
    }

    #[tokio::test]
    async fn valid_key_is_accepted() {
        let mut service = ServiceBuilder::new()
            .layer(ApiKeyAuthLayer::new("sesame"))
            .service_fn(check_client);

        let request = HttpRequest::get("/")
            .header(header::AUTHORIZATION, "Bearer sesame")
            .body(Body::empty())
            .unwrap();
        let res = service.ready().await.unwrap().call(request).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let mut service = ServiceBuilder::new()
            .layer(ApiKeyAuthLayer::new("sesame"))
            .service_fn(check_client);

        let request = HttpRequest::get("/")
            .header(header::AUTHORIZATION, "Bearer wrong")
            .body(Body::empty())
            .unwrap();
        let res = service.ready().await.unwrap().call(request).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn layers_onto_a_router() {
        let app = axum::Router::new()
            .route("/", axum::routing::get(|| async { StatusCode::OK }))
            .layer(ApiKeyAuthLayer::new("sesame"));

        let request = HttpRequest::get("/")
            .header(header::AUTHORIZATION, "Bearer sesame")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(request).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let mut service = ServiceBuilder::new()
            .layer(ApiKeyAuthLayer::new("sesame"))
            .service_fn(check_client);

        let request = HttpRequest::get("/").body(Body::empty()).unwrap();
        let res = service.ready().await.unwrap().call(request).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
