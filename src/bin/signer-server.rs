//! Signer service entrypoint (deployment unit A).

use std::sync::Arc;

use aws_config::BehaviorVersion;
use presigned_redirect_server::auth::PublicAccessAuthLayer;
use presigned_redirect_server::catalog::s3::S3Catalog;
use presigned_redirect_server::config::SignerConfig;
use presigned_redirect_server::router::build_signer_router;
use presigned_redirect_server::signer::s3::S3UrlSigner;
use presigned_redirect_server::state::SignerServerState;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match SignerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "refusing to start");
            std::process::exit(1);
        }
    };

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let region = aws_config
        .region()
        .map(|r| r.to_string())
        .unwrap_or_default();
    let s3_client = aws_sdk_s3::Client::new(&aws_config);

    let catalog = Arc::new(S3Catalog::new(s3_client.clone(), config.bucket()));
    let signer = Arc::new(
        S3UrlSigner::new(s3_client, config.bucket()).with_validity(config.url_validity()),
    );
    let state = SignerServerState::new(catalog, signer, config.default_object());

    let app = build_signer_router(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(PublicAccessAuthLayer::new());

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr = %addr, "could not bind");
            std::process::exit(1);
        }
    };

    // Hand-off values consumed by the gateway deployment.
    println!("export CDK_S3_BUCKET_NAME={}", config.bucket());
    println!("export CDK_S3_BUCKET_REGION={}", region);
    println!("export CDK_PRESIGNED_URL=http://{}/presigned", addr);

    tracing::info!(addr = %addr, bucket = %config.bucket(), "signer service listening");
    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }
}
