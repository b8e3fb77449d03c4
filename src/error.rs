#![allow(missing_docs)]

use std::fmt::Display;

use axum::{http::header, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::{
    catalog::CatalogError,
    params::{ParameterStoreError, ParameterStoreErrorKind},
    signer::{SignerError, SignerErrorKind},
};

pub type Result<T> = core::result::Result<T, ServerError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServerErrorKind {
    InvalidParameters,
    Unauthorized,
    ResourceNotFound,
    Gateway,
    Internal,
}

impl Display for ServerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameters => write!(f, "INVALID_PARAMETERS"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::ResourceNotFound => write!(f, "RESOURCE_NOT_FOUND"),
            Self::Gateway => write!(f, "GATEWAY_ERROR"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    kind: ServerErrorKind,
    message: String,
}

impl ServerError {
    pub fn new(kind: ServerErrorKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn kind(&self) -> ServerErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn invalid_query_params(message: impl Into<String>) -> Self {
        Self::new(ServerErrorKind::InvalidParameters, message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ServerErrorKind::Unauthorized, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ServerErrorKind::ResourceNotFound, message.into())
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        Self::new(ServerErrorKind::Gateway, message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ServerErrorKind::Internal, message.into())
    }

    pub fn into_error_response(self) -> ErrorResponse {
        ErrorResponse {
            error_code: self.kind.to_string(),
            message: self.message,
        }
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ServerError {}

impl From<CatalogError> for ServerError {
    fn from(err: CatalogError) -> Self {
        ServerError::internal(err.to_string())
    }
}

impl From<SignerError> for ServerError {
    fn from(err: SignerError) -> Self {
        match err.kind() {
            SignerErrorKind::ObjectNotFound => ServerError::not_found(err.message()),
            SignerErrorKind::CredentialUnavailable | SignerErrorKind::Internal => {
                ServerError::internal(err.message())
            }
        }
    }
}

impl From<ParameterStoreError> for ServerError {
    fn from(err: ParameterStoreError) -> Self {
        match err.kind() {
            ParameterStoreErrorKind::ParameterNotFound
            | ParameterStoreErrorKind::Internal => ServerError::gateway(err.message()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    error_code: String,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self, details = ?self, "Returning error response");
        let status_code = match self.kind() {
            ServerErrorKind::InvalidParameters => StatusCode::BAD_REQUEST,
            ServerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerErrorKind::ResourceNotFound => StatusCode::NOT_FOUND,
            ServerErrorKind::Gateway => StatusCode::BAD_GATEWAY,
            ServerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status_code,
            [(
                header::CONTENT_TYPE.as_str(),
                "application/json; charset=utf-8",
            )],
            Json(self.into_error_response()),
        )
            .into_response()
    }
}
