// src/error.rs
//! HTTP-boundary error type. Adapters and clients speak `anyhow` /
//! `AiError` internally; handlers map everything into one JSON error shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::ai::AiError;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid client input.
    BadRequest(String),
    /// Required upstream credentials are not configured. Checked per
    /// request; there is no startup validation.
    MissingConfig(String),
    /// An upstream dependency failed and the failure is not recoverable
    /// per-branch. The upstream message is passed through.
    Upstream(String),
    /// AI call failed on a path with no deterministic fallback.
    Ai(AiError),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::MissingConfig(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("missing configuration: {m}"),
            ),
            ApiError::Upstream(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
            ApiError::Ai(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Internal(e) => {
                tracing::error!(error = ?e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl From<AiError> for ApiError {
    fn from(e: AiError) -> Self {
        ApiError::Ai(e)
    }
}
