// src/error.rs
//! Application error types with structured error handling.
//!
//! `AppError` is the vocabulary for failures inside the service (content
//! source, configuration, cache). `ApiError` is what route handlers turn
//! failures into at the HTTP boundary; no error crosses a handler
//! unformatted.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded
    RateLimited,
    /// The requested object does not exist or is not shared with the integration
    ObjectNotFound,
    /// API key is invalid or expired
    Unauthorized,
    /// API key lacks permission for this resource
    RestrictedResource,
    /// Request parameters failed Notion's validation
    ValidationFailed,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "validation_error" => Self::ValidationFailed,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound | Self::HttpStatus(404))
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: u16,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Revalidation failed for {target}: {reason}")]
    RevalidationFailed { target: String, reason: String },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl AppError {
    /// Whether the content source reported the requested object as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotionService { code, .. } if code.is_not_found())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// HTTP-facing error, rendered as `{status: "error", error, message?}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad shared secret.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed request (missing signature, unparseable body, bad params).
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The content source failed while serving a read.
    #[error("upstream error: {0}")]
    Upstream(#[source] AppError),

    #[error("internal error: {0}")]
    Internal(#[source] AppError),
}

#[derive(Debug, Clone, Serialize)]
struct ErrorResponse {
    status: &'static str,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            Self::Upstream(err) => {
                log::error!("Content source failure: {}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "Content source unavailable".to_string(),
                    Some(err.to_string()),
                )
            }
            Self::Internal(err) => {
                log::error!("Internal server error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(err.to_string()),
                )
            }
        };

        let body = ErrorResponse {
            status: "error",
            error,
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Failures reading content: configuration gaps are ours, the rest are the
/// content source's.
impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::MissingConfiguration(_) => Self::Internal(err),
            other => Self::Upstream(other),
        }
    }
}
