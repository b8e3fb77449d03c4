//! Routers for the signer service and the distribution front.

use std::sync::Arc;

use axum::debug_handler;
use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{info_span, Instrument};

use crate::{
    auth::ClientId,
    edge::ViewerRequest,
    error::Result,
    extract::ObjectKeyQuery,
    front::{DistributionFront, FrontResponse},
    response::PresignedUrlResponse,
    state::SignerServerState,
};

/// Builds the router for the signer service.
pub fn build_signer_router(state: Arc<SignerServerState>) -> Router {
    Router::new()
        .route("/presigned", get(issue_presigned_url))
        .with_state(state)
}

#[debug_handler]
async fn issue_presigned_url(
    state: State<Arc<SignerServerState>>,
    client_id: ClientId,
    key: ObjectKeyQuery,
) -> Result<PresignedUrlResponse> {
    let span = info_span!("issue_presigned_url", %client_id, ?key);
    let signed = state
        .issue_signed_url(key.uri.as_deref())
        .instrument(span)
        .await?;
    Ok(PresignedUrlResponse::from(signed))
}

/// Builds the router for the distribution front.
///
/// Every request, whatever the path, goes through the front. Only GET and
/// HEAD are allowed.
pub fn build_front_router(front: Arc<DistributionFront>) -> Router {
    Router::new()
        .fallback(serve_viewer_request)
        .with_state(front)
}

#[debug_handler]
async fn serve_viewer_request(
    front: State<Arc<DistributionFront>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let request = ViewerRequest::new(uri.path(), uri.query().unwrap_or_default());
    let span = info_span!("serve_viewer_request", uri = %uri);
    let response: FrontResponse = front.handle(request).instrument(span).await;
    response.into_response()
}
