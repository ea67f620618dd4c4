//! Retry helper for HTTP requests with exponential backoff.
//!
//! This module retries requests that fail with HTTP 429 (Too Many Requests),
//! sleeping 1s, 2s, 4s (2^attempt) between attempts, and maps every other
//! non-success status onto a [`ClientError`] variant.

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ClientError, Result};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Maximum number of retry attempts for rate-limited requests.
const DEFAULT_MAX_RETRIES: usize = 3;

/// Error body returned by the management API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: String,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        match (self.message.is_empty(), self.details.is_empty()) {
            (true, true) => None,
            (false, true) => Some(self.message),
            (true, false) => Some(self.details),
            (false, false) if self.message == self.details => Some(self.message),
            (false, false) => Some(format!("{}: {}", self.message, self.details)),
        }
    }
}

/// Sends an HTTP request, retrying HTTP 429 responses with exponential backoff.
///
/// # Errors
///
/// - `MaxRetriesExceeded` when every attempt was rate limited.
/// - `Unauthorized` / `Forbidden` / `NotFound` for 401 / 403 / 404.
/// - `ApiError` for any other non-success status.
/// - `HttpError` for transport failures, which are not retried.
pub async fn send_request_with_retry(
    builder: RequestBuilder,
    max_retries: usize,
) -> Result<Response> {
    let max_retries = if max_retries == 0 {
        DEFAULT_MAX_RETRIES
    } else {
        max_retries
    };

    for attempt in 0..=max_retries {
        let Some(attempt_builder) = builder.try_clone() else {
            if attempt == 0 {
                debug!("Request builder cannot be cloned, single attempt only");
                let response = builder.send().await?;
                return check_status(response).await;
            }
            return Err(ClientError::MaxRetriesExceeded(attempt));
        };

        let response = attempt_builder.send().await?;
        if response.status().as_u16() != 429 {
            if attempt > 0 {
                debug!(attempt = attempt + 1, "Request succeeded after retry");
            }
            return check_status(response).await;
        }

        if attempt < max_retries {
            let backoff_secs = 2u64.pow(attempt as u32);
            debug!(
                attempt = attempt + 1,
                max_retries = max_retries + 1,
                backoff_secs,
                "Rate limited (HTTP 429), retrying with exponential backoff"
            );
            tokio::time::sleep(tokio::time::Duration::from_secs(backoff_secs)).await;
        }
    }

    debug!(
        attempts = max_retries + 1,
        "Max retries exhausted for rate-limited request"
    );
    Err(ClientError::MaxRetriesExceeded(max_retries + 1))
}

/// Pass a success response through; turn anything else into an error.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response body".to_string());
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or(body);

    Err(match status.as_u16() {
        401 => ClientError::Unauthorized(message),
        403 => ClientError::Forbidden(message),
        404 => ClientError::NotFound(message),
        code => ClientError::ApiError {
            status: code,
            url,
            message,
        },
    })
}

/// Decode a JSON response body.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().to_string();
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::InvalidResponse(format!("{url}: {e}")))
}
