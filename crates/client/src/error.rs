//! Error types for the management API client.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Non-success response from the management API.
    #[error("API error ({status}) at {url}: {message}")]
    ApiError {
        status: u16,
        url: String,
        message: String,
    },

    /// The API key is missing, invalid or expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The session lacks the authorization for this operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Maximum retries exceeded.
    #[error("Maximum retries exceeded ({0} attempts)")]
    MaxRetriesExceeded(usize),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A request argument was rejected before anything was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Check if this error is transient and a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) | Self::Timeout(_) | Self::MaxRetriesExceeded(_) => true,
            Self::ApiError { status, .. } => Self::is_retryable_status(*status),
            _ => false,
        }
    }

    /// Check if an HTTP status code is retryable.
    ///
    /// Retryable: 429, 502, 503, 504. Everything else fails immediately.
    pub fn is_retryable_status(status: u16) -> bool {
        matches!(status, 429 | 502 | 503 | 504)
    }

    /// Check if this error indicates an authentication or authorization failure.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }

    /// Short user-facing description without the request URL.
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiError { status, message, .. } => format!("{message} (HTTP {status})"),
            Self::HttpError(e) if e.is_timeout() => "request timed out".to_string(),
            Self::HttpError(e) if e.is_connect() => "could not connect to server".to_string(),
            other => other.to_string(),
        }
    }
}
