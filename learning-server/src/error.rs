//! Error types for the learning server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error types for request handling and model operations.
///
/// Only `InvalidRequest` and the storage variants ever reach a client; model
/// errors are consumed by the inference router and turned into fallbacks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Load failed: {0}")]
    LoadFailed(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Engine communication error: {0}")]
    Communication(String),

    #[error("Storage not available")]
    StorageUnavailable,

    #[error("Storage error: {0}")]
    Storage(#[from] crate::store::StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EngineNotAvailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::ModelNotFound(_) => StatusCode::NOT_FOUND,
            Error::InferenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::LoadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Communication(_) => StatusCode::BAD_GATEWAY,
            Error::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status.as_u16(), "{}", self);
        }

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
