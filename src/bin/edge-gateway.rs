//! Distribution front entrypoint (deployment unit B).
//!
//! Requires the three hand-off values from the signer deployment in the
//! environment; refuses to start without them.

use std::sync::Arc;

use aws_config::BehaviorVersion;
use presigned_redirect_server::config::HandoffConfig;
use presigned_redirect_server::edge::{EdgeConfig, EdgeRedirect};
use presigned_redirect_server::front::{
    DistributionFront, HttpOriginFetcher, OriginProtocolPolicy,
};
use presigned_redirect_server::params::memory::MemoryParameterStore;
use presigned_redirect_server::params::ssm::SsmParameterStore;
use presigned_redirect_server::params::{ParameterStore, REDIRECT_TARGET_PARAMETER};
use presigned_redirect_server::router::build_front_router;
use tower_http::trace::TraceLayer;
use url::Url;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Fail on missing hand-off values before any resource is created.
    let handoff = match HandoffConfig::from_env() {
        Ok(handoff) => handoff,
        Err(err) => {
            tracing::error!(error = %err, "refusing to start");
            std::process::exit(1);
        }
    };

    let params: Arc<dyn ParameterStore> = if std::env::var("USE_SSM").is_ok() {
        let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Arc::new(SsmParameterStore::new(aws_sdk_ssm::Client::new(&aws_config)))
    } else {
        // Local runs seed the well-known parameter from the hand-off value
        // the way the deployment would.
        let store = MemoryParameterStore::new();
        store.put_parameter(REDIRECT_TARGET_PARAMETER, handoff.signer_url());
        Arc::new(store)
    };

    let edge = match EdgeRedirect::new(params, EdgeConfig::default()) {
        Ok(edge) => edge,
        Err(err) => {
            tracing::error!(error = %err, "could not build the edge redirect step");
            std::process::exit(1);
        }
    };

    let policy = if std::env::var("ALLOW_HTTP_ORIGIN").is_ok() {
        OriginProtocolPolicy::AllowHttp
    } else {
        OriginProtocolPolicy::HttpsOnly
    };
    let origin = match HttpOriginFetcher::with_policy(policy) {
        Ok(origin) => Arc::new(origin),
        Err(err) => {
            tracing::error!(error = %err, "could not build the origin client");
            std::process::exit(1);
        }
    };

    let origin_base = match Url::parse(&format!(
        "{}://{}",
        policy.origin_scheme(),
        handoff.origin_host()
    )) {
        Ok(url) => url,
        Err(err) => {
            tracing::error!(error = %err, "invalid origin host");
            std::process::exit(1);
        }
    };

    let front = DistributionFront::new(edge, origin, origin_base);
    let app = build_front_router(Arc::new(front)).layer(TraceLayer::new_for_http());

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr = %addr, "could not bind");
            std::process::exit(1);
        }
    };

    tracing::info!(
        addr = %addr,
        origin = %handoff.origin_host(),
        signer = %handoff.signer_url(),
        "distribution front listening"
    );
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }
}
