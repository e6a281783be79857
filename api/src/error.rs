//! Error kinds surfaced by the render pass and the HTTP layer.
//!
//! `AppError` carries one variant per recoverable (or fatal) failure class of
//! the chat page. The render pass is the only place that turns them into
//! banners. `ApiError` covers malformed requests that never reach a pass.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Error processing file: {0:#}")]
    Load(anyhow::Error),
    #[error("Failed to initialize chat engine: {0:#}")]
    Initialize(anyhow::Error),
    #[error("Error generating response: {0:#}")]
    Chat(anyhow::Error),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 - the form or multipart body is unusable.
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("invalid upload: {}", err))
    }
}
