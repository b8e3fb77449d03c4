use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::front::{FrontResponse, RequestOutcome};
use crate::signer::SignedUrl;

/// Body of a successful `presigned` response.
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrlResponse {
    presigned_url: String,
}

impl PresignedUrlResponse {
    /// The issued url.
    pub fn presigned_url(&self) -> &str {
        &self.presigned_url
    }
}

impl From<SignedUrl> for PresignedUrlResponse {
    fn from(value: SignedUrl) -> Self {
        Self {
            presigned_url: value.url().to_string(),
        }
    }
}

impl IntoResponse for PresignedUrlResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
            Json(self),
        )
            .into_response()
    }
}

impl IntoResponse for FrontResponse {
    fn into_response(self) -> Response {
        let cache_status = match self.outcome {
            RequestOutcome::CacheHit => "Hit",
            RequestOutcome::OriginFetched => "Miss",
            RequestOutcome::Redirected => "Redirect",
            RequestOutcome::Failed => "Error",
        };

        let mut builder = Response::builder()
            .status(self.status)
            .header("x-cache", cache_status);
        if let Some(content_type) = &self.content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(location) = &self.location {
            builder = builder.header(header::LOCATION, location);
        }

        builder
            .body(axum::body::Body::from(self.body))
            .unwrap_or_else(|_| {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Utc;
    use std::time::Duration;

    #[test]
    fn presigned_body_shape() {
        let signed = SignedUrl::new(
            "https://store.example/key?X-Amz-Signature=sig".to_string(),
            Utc::now(),
            Duration::from_secs(3600),
        );
        let body = serde_json::to_value(PresignedUrlResponse::from(signed)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"presigned_url": "https://store.example/key?X-Amz-Signature=sig"})
        );
    }

    #[test]
    fn redirect_response_carries_location() {
        let front = FrontResponse {
            status: StatusCode::FOUND,
            content_type: None,
            location: Some("/helloworld.html?X-Amz-Signature=sig".to_string()),
            body: Bytes::new(),
            outcome: RequestOutcome::Redirected,
        };
        let response = front.into_response();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/helloworld.html?X-Amz-Signature=sig"
        );
        assert_eq!(response.headers().get("x-cache").unwrap(), "Redirect");
    }
}
