//! Error types for the Launchpad service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use openapi_server::models::{ErrorResponse, FieldError};
use thiserror::Error;
use tracing::error;

/// Main error type for the Launchpad service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{message}")]
    ValidationError {
        message: String,
        details: Vec<FieldError>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    EnvVarConflict(String),

    #[error("{0}")]
    UpstreamError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Crypto error: {0}")]
    CryptoError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// A validation error without field details
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::ValidationError {
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine readable error code used in response bodies
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::ValidationError { .. } => "validation_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::EnvVarConflict(_) => "env_var_conflict",
            ServiceError::UpstreamError(_) => "upstream_error",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let details = match &self {
            ServiceError::ValidationError { details, .. } if !details.is_empty() => {
                Some(details.clone())
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
