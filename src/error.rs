//! API error type shared by every route handler.
//!
//! One variant per error kind the service distinguishes, each mapped to
//! a single HTTP status. Bodies are human-readable strings, no
//! structured error codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error body shape shared by every failing response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (400).
    #[error("{0}")]
    Validation(String),

    /// Update targeting a column outside the allow-list (403).
    #[error("campo '{0}' não pode ser alterado")]
    ForbiddenField(String),

    /// Missing slug/id (404).
    #[error("{0}")]
    NotFound(String),

    /// External API failure (502).
    #[error("falha ao consultar {0}")]
    Upstream(String),

    /// Dependency not configured or temporarily unusable (503).
    #[error("{0}")]
    Unavailable(String),

    /// Connection or SQL failure (500). Details are logged, not leaked.
    #[error("erro interno no servidor")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::ForbiddenField(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Database(ref e) = self {
            tracing::error!("Database error: {}", e);
        }

        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
            message: None,
        };
        (status, Json(body)).into_response()
    }
}
