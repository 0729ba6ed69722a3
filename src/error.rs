use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the HTTP API. Clients only ever see the status code and
/// the short message; the cause of an `Upstream` error is logged server-side.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter is missing or malformed.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Search, episode lookup, generation or database failure.
    #[error("{message}: {source:#}")]
    Upstream {
        message: String,
        source: anyhow::Error,
    },
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream { message, source } => {
                tracing::error!(error = %format!("{source:#}"), "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Upstream {
            message: msg.into(),
            source: source.into(),
        }
    }
}
