//! Signer server state.

use std::sync::Arc;

use crate::{
    catalog::ObjectCatalog,
    error::ServerError,
    signer::{SignedUrl, UrlSigner},
};

/// State of the signer server.
#[derive(Clone)]
pub struct SignerServerState {
    catalog: Arc<dyn ObjectCatalog>,
    signer: Arc<dyn UrlSigner>,
    default_object: String,
}

impl SignerServerState {
    /// Create a new signer server state.
    pub fn new(
        catalog: Arc<dyn ObjectCatalog>,
        signer: Arc<dyn UrlSigner>,
        default_object: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            signer,
            default_object: default_object.into(),
        }
    }

    /// Get the catalog from the state.
    pub fn catalog(&self) -> Arc<dyn ObjectCatalog> {
        self.catalog.clone()
    }

    /// Get the url signer from the state.
    pub fn signer(&self) -> Arc<dyn UrlSigner> {
        self.signer.clone()
    }

    /// Issue a signed url for the requested object key.
    ///
    /// A missing key selects the configured default object. A single
    /// leading slash is stripped, so `/helloworld.html` and
    /// `helloworld.html` name the same object. Keys outside the allow-list
    /// fail with a not-found error.
    pub async fn issue_signed_url(&self, key: Option<&str>) -> Result<SignedUrl, ServerError> {
        let key = key.unwrap_or(&self.default_object);
        let key = key.strip_prefix('/').unwrap_or(key);
        if key.is_empty() {
            return Err(ServerError::invalid_query_params(
                "object key must not be empty",
            ));
        }

        if !self.catalog.contains(key).await? {
            return Err(ServerError::not_found(format!(
                "object `{}` is not available for signing",
                key
            )));
        }

        let signed = self.signer.sign_url(key).await?;
        tracing::info!(key = %key, expires_at = %signed.expires_at(), "issued signed url");
        Ok(signed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, MockObjectCatalog};
    use crate::error::ServerErrorKind;
    use crate::signer::MockUrlSigner;
    use chrono::Utc;
    use std::time::Duration;

    fn allow_all_catalog() -> MockObjectCatalog {
        let mut catalog = MockObjectCatalog::new();
        catalog.expect_contains().returning(|_| Ok(true));
        catalog
    }

    fn echo_signer() -> MockUrlSigner {
        let mut signer = MockUrlSigner::new();
        signer.expect_sign_url().returning(|key| {
            Ok(SignedUrl::new(
                format!("https://store.example/{}?X-Amz-Signature=sig", key),
                Utc::now(),
                Duration::from_secs(3600),
            ))
        });
        signer
    }

    #[tokio::test]
    async fn issues_url_for_allowed_key() {
        let state = SignerServerState::new(
            Arc::new(allow_all_catalog()),
            Arc::new(echo_signer()),
            "helloworld.html",
        );

        let signed = state.issue_signed_url(Some("media/logo.png")).await.unwrap();
        assert!(signed.url().starts_with("https://store.example/media/logo.png"));
    }

    #[tokio::test]
    async fn missing_key_falls_back_to_default_object() {
        let state = SignerServerState::new(
            Arc::new(allow_all_catalog()),
            Arc::new(echo_signer()),
            "helloworld.html",
        );

        let signed = state.issue_signed_url(None).await.unwrap();
        assert!(signed.url().starts_with("https://store.example/helloworld.html"));
    }

    #[tokio::test]
    async fn leading_slash_is_stripped() {
        let mut catalog = MockObjectCatalog::new();
        catalog
            .expect_contains()
            .withf(|key| key == "helloworld.html")
            .returning(|_| Ok(true));
        let state = SignerServerState::new(
            Arc::new(catalog),
            Arc::new(echo_signer()),
            "helloworld.html",
        );

        state.issue_signed_url(Some("/helloworld.html")).await.unwrap();
    }

    #[tokio::test]
    async fn disallowed_key_is_not_found() {
        let mut catalog = MockObjectCatalog::new();
        catalog.expect_contains().returning(|_| Ok(false));
        let state = SignerServerState::new(
            Arc::new(catalog),
            Arc::new(echo_signer()),
            "helloworld.html",
        );

        let err = state.issue_signed_url(Some("secret.txt")).await.unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::ResourceNotFound);
    }

    #[tokio::test]
    async fn catalog_failure_is_internal() {
        let mut catalog = MockObjectCatalog::new();
        catalog
            .expect_contains()
            .returning(|_| Err(CatalogError::connection("store unreachable")));
        let state = SignerServerState::new(
            Arc::new(catalog),
            Arc::new(echo_signer()),
            "helloworld.html",
        );

        let err = state.issue_signed_url(None).await.unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::Internal);
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let state = SignerServerState::new(
            Arc::new(allow_all_catalog()),
            Arc::new(echo_signer()),
            "helloworld.html",
        );

        let err = state.issue_signed_url(Some("/")).await.unwrap_err();
        assert_eq!(err.kind(), ServerErrorKind::InvalidParameters);
    }
}
