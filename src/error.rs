//! Error types for the grading service.
//!
//! Provider failures are surfaced to the caller verbatim; the endpoint they
//! happen on decides the status code.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Failure talking to the language-model or billing provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, TLS, timeout...).
    Transport(String),
    /// The provider answered with a non-success status.
    Api { status: u16, message: String },
    /// The provider answered 2xx but the body was not what we expected.
    MalformedResponse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "{}", msg),
            Self::Api { message, .. } => write!(f, "{}", message),
            Self::MalformedResponse(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Error returned by the HTTP endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum GraderError {
    /// A required grading field was missing or empty.
    Validation(String),
    /// The service is missing configuration needed for this endpoint.
    Configuration(String),
    /// The language-model provider failed.
    Grading(ProviderError),
    /// The billing provider failed.
    Checkout(ProviderError),
    /// The caller used up their quota for the current window.
    QuotaExceeded { limit: u32, retry_after_secs: u64 },
}

impl fmt::Display for GraderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{}", msg),
            Self::Configuration(msg) => write!(f, "{}", msg),
            Self::Grading(e) => write!(f, "{}", e),
            Self::Checkout(e) => write!(f, "{}", e),
            Self::QuotaExceeded { limit, .. } => {
                write!(f, "Too many requests: limit of {} per day reached.", limit)
            }
        }
    }
}

impl std::error::Error for GraderError {}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl GraderError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::BAD_REQUEST,
            Self::Grading(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Checkout(_) => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Short machine-readable kind, used in logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Configuration(_) => "configuration_error",
            Self::Grading(_) | Self::Checkout(_) => "provider_error",
            Self::QuotaExceeded { .. } => "quota_exceeded",
        }
    }
}

impl IntoResponse for GraderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        match self {
            Self::QuotaExceeded {
                retry_after_secs, ..
            } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
