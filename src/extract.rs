use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;

use crate::{auth::ClientId, error::ServerError};

#[async_trait]
impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client_id = parts
            .extensions
            .get::<ClientId>()
            .ok_or_else(|| {
                tracing::error!("the `ClientId` extension was not set");
                ServerError::unauthorized("the `ClientId` extension was not set")
            })
            .map(|x| x.clone())?;

        Ok(client_id)
    }
}

/// Query parameters accepted by the `presigned` route.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ObjectKeyQuery {
    /// Requested object key. Absent means the configured default object.
    pub uri: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for ObjectKeyQuery
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let value = serde_urlencoded::from_str(query)
            .map_err(|e| ServerError::invalid_query_params(e.to_string()))?;
        Ok(value)
    }
}
