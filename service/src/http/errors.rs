//! Upstream API errors and their classification

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::errors::ServiceError;

/// Provider error code for an environment variable that already exists
pub const ENV_ALREADY_EXISTS_CODE: &str = "ENV_ALREADY_EXISTS";

/// Failure of a single outbound call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The request never produced a response, or the body could not be read
    #[error("{0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    /// Classify this failure
    pub fn classify(&self) -> UpstreamFailure {
        match self {
            ApiError::Status { status, body } => parse_upstream_failure(Some(*status), body),
            ApiError::Network(e) => parse_upstream_failure(None, &e.to_string()),
        }
    }
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        ServiceError::UpstreamError(err.classify().into_message())
    }
}

/// Classified upstream failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// The resource already exists
    Conflict(String),
    /// The upstream rejected the request payload
    Validation(String),
    /// Any other upstream answer (auth, server error, unknown)
    Upstream(String),
    /// No response was received
    Network(String),
}

impl UpstreamFailure {
    pub fn is_conflict(&self) -> bool {
        matches!(self, UpstreamFailure::Conflict(_))
    }

    pub fn message(&self) -> &str {
        match self {
            UpstreamFailure::Conflict(m)
            | UpstreamFailure::Validation(m)
            | UpstreamFailure::Upstream(m)
            | UpstreamFailure::Network(m) => m,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            UpstreamFailure::Conflict(m)
            | UpstreamFailure::Validation(m)
            | UpstreamFailure::Upstream(m)
            | UpstreamFailure::Network(m) => m,
        }
    }
}

/// Classify an upstream failure from its status and raw body
///
/// A missing status means the request failed before any response arrived;
/// `body` then holds the transport error text.
pub fn parse_upstream_failure(status: Option<StatusCode>, body: &str) -> UpstreamFailure {
    let Some(status) = status else {
        return UpstreamFailure::Network(body.to_string());
    };

    let json: Option<Value> = serde_json::from_str(body).ok();
    let message = json
        .as_ref()
        .and_then(extract_error_message)
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| status.to_string());

    let code = json.as_ref().and_then(extract_error_code);
    let is_conflict = status == StatusCode::CONFLICT
        || (status == StatusCode::BAD_REQUEST && code.as_deref() == Some(ENV_ALREADY_EXISTS_CODE))
        || message.to_lowercase().contains("already exists");

    if is_conflict {
        UpstreamFailure::Conflict(message)
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        UpstreamFailure::Validation(message)
    } else {
        UpstreamFailure::Upstream(message)
    }
}

/// Best-effort human readable message from an upstream error body
///
/// Checked in order: a bare string, `message`, `error` as a string,
/// `error.message`, `error_description`, then an array of error objects.
pub fn extract_error_message(body: &Value) -> Option<String> {
    fn non_empty(v: &Value) -> Option<String> {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    if let Some(s) = non_empty(body) {
        return Some(s);
    }
    if let Some(s) = body.get("message").and_then(non_empty) {
        return Some(s);
    }
    if let Some(error) = body.get("error") {
        if let Some(s) = non_empty(error) {
            return Some(s);
        }
        if let Some(s) = error.get("message").and_then(non_empty) {
            return Some(s);
        }
    }
    if let Some(s) = body.get("error_description").and_then(non_empty) {
        return Some(s);
    }

    let list = body
        .as_array()
        .or_else(|| body.get("errors").and_then(Value::as_array))?;
    let messages: Vec<String> = list
        .iter()
        .filter_map(|item| non_empty(item).or_else(|| item.get("message").and_then(non_empty)))
        .collect();
    (!messages.is_empty()).then(|| messages.join("; "))
}

fn extract_error_code(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|e| e.get("code"))
        .or_else(|| body.get("code"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
