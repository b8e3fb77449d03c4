use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use presigned_redirect_server::auth::PublicAccessAuthLayer;
use presigned_redirect_server::catalog::file::FileCatalog;
use presigned_redirect_server::edge::{EdgeConfig, EdgeRedirect};
use presigned_redirect_server::front::{
    DistributionFront, HttpOriginFetcher, OriginProtocolPolicy,
};
use presigned_redirect_server::params::memory::MemoryParameterStore;
use presigned_redirect_server::params::REDIRECT_TARGET_PARAMETER;
use presigned_redirect_server::router::{build_front_router, build_signer_router};
use presigned_redirect_server::signer::hmac::HmacUrlSigner;
use presigned_redirect_server::state::SignerServerState;
use tower_http::trace::TraceLayer;
use url::Url;

mod common;
use common::server::TestClient;

/// Stub object store origin counting how often each object is fetched.
#[derive(Default)]
struct OriginState {
    hits: AtomicUsize,
}

async fn serve_helloworld(state: State<Arc<OriginState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html")],
        "<h1>hello world</h1>",
    )
}

async fn serve_forbidden(state: State<Arc<OriginState>>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "application/xml")],
        "<Error><Code>AccessDenied</Code></Error>",
    )
}

struct TwoUnitSetup {
    viewer: TestClient,
    origin_state: Arc<OriginState>,
}

/// Wire up both deployment units against a stub origin: the signer
/// service on one ephemeral socket, the distribution front on another,
/// with the signer endpoint handed over through the parameter store.
async fn two_unit_setup() -> TwoUnitSetup {
    tracing_subscriber::fmt::try_init().ok();

    let origin_state = Arc::new(OriginState::default());
    let origin_app = Router::new()
        .route("/helloworld.html", get(serve_helloworld))
        .route("/forbidden.html", get(serve_forbidden))
        .with_state(origin_state.clone());
    let origin = TestClient::bind(origin_app).await;

    let store_base = Url::parse(&origin.base_url()).unwrap();
    let catalog = Arc::new(FileCatalog::from_keys(["helloworld.html", "forbidden.html"]));
    let signer = Arc::new(HmacUrlSigner::new(*b"front-test-credential", store_base.clone()));
    let signer_state = Arc::new(SignerServerState::new(catalog, signer, "helloworld.html"));
    let signer_app = build_signer_router(signer_state)
        .layer(TraceLayer::new_for_http())
        .layer(PublicAccessAuthLayer::new());
    let signer_server = TestClient::bind(signer_app).await;

    let params = MemoryParameterStore::new();
    params.put_parameter(
        REDIRECT_TARGET_PARAMETER,
        format!("{}/presigned", signer_server.base_url()),
    );

    let edge = EdgeRedirect::new(Arc::new(params), EdgeConfig::default()).unwrap();
    let fetcher = Arc::new(HttpOriginFetcher::with_policy(OriginProtocolPolicy::AllowHttp).unwrap());
    let front = DistributionFront::new(edge, fetcher, store_base);
    let front_app = build_front_router(Arc::new(front)).layer(TraceLayer::new_for_http());
    let viewer = TestClient::bind(front_app).await;

    TwoUnitSetup {
        viewer,
        origin_state,
    }
}

#[tokio::test]
async fn viewer_is_redirected_then_served_from_origin_then_cache() {
    let setup = two_unit_setup().await;

    // First request: the edge answers with a redirect to the signed url.
    let redirect = setup.viewer.get("/helloworld.html").send().await;
    assert_eq!(redirect.status(), StatusCode::FOUND);
    let location = redirect.header("location").unwrap();
    assert!(location.starts_with("/helloworld.html?"));
    assert!(location.contains("X-Amz-Signature="));
    assert_eq!(setup.origin_state.hits.load(Ordering::SeqCst), 0);

    // Following the redirect reaches the origin.
    let served = setup.viewer.get(&location).send().await;
    served.assert_status_ok();
    assert_eq!(served.header("x-cache").as_deref(), Some("Miss"));
    assert_eq!(served.text().await, "<h1>hello world</h1>");
    assert_eq!(setup.origin_state.hits.load(Ordering::SeqCst), 1);

    // An identical request is a cache hit; the origin is not touched again.
    let cached = setup.viewer.get(&location).send().await;
    cached.assert_status_ok();
    assert_eq!(cached.header("x-cache").as_deref(), Some("Hit"));
    assert_eq!(cached.text().await, "<h1>hello world</h1>");
    assert_eq!(setup.origin_state.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn origin_errors_are_surfaced_but_not_cached() {
    let setup = two_unit_setup().await;

    let redirect = setup.viewer.get("/forbidden.html").send().await;
    assert_eq!(redirect.status(), StatusCode::FOUND);
    let location = redirect.header("location").unwrap();

    let first = setup.viewer.get(&location).send().await;
    assert_eq!(first.status(), StatusCode::FORBIDDEN);
    assert_eq!(setup.origin_state.hits.load(Ordering::SeqCst), 1);

    let second = setup.viewer.get(&location).send().await;
    assert_eq!(second.status(), StatusCode::FORBIDDEN);
    assert_eq!(setup.origin_state.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_redirect_target_yields_bad_gateway() {
    tracing_subscriber::fmt::try_init().ok();

    let params = MemoryParameterStore::new();
    let edge = EdgeRedirect::new(Arc::new(params), EdgeConfig::default()).unwrap();
    let fetcher = Arc::new(HttpOriginFetcher::new().unwrap());
    let origin_base = Url::parse("https://demo-bucket.s3.us-gov-west-1.amazonaws.com").unwrap();
    let front = DistributionFront::new(edge, fetcher, origin_base);
    let viewer = TestClient::bind(build_front_router(Arc::new(front))).await;

    let response = viewer.get("/helloworld.html").send().await;
    response.assert_status_bad_gateway();
}
