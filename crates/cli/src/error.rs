//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map `ClientError`, bulk-delete and validation outcomes to exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//! - Signal handling (see `main` for the SIGINT listener).
//!
//! Invariants:
//! - Exit codes 1-9 are reserved for specific error categories.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use std::sync::Arc;

use fleetdeck_client::{ClientError, ResourceKey};
use fleetdeck_table::{BulkError, ValidationErrors};
use thiserror::Error;

/// Structured exit codes for fleetdeck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success - command completed successfully.
    Success = 0,

    /// General error - unhandled or generic failure.
    GeneralError = 1,

    /// Authentication failure - missing, invalid or expired API key.
    AuthenticationFailed = 2,

    /// Connection error - network, timeout, or DNS failure.
    ///
    /// Scripts may retry with exponential backoff.
    ConnectionError = 3,

    /// Resource not found - unknown row key or missing API object.
    NotFound = 4,

    /// Validation error - rejected input, nothing was sent.
    ValidationError = 5,

    /// Permission denied - the session lacks the write authorization.
    PermissionDenied = 6,

    /// Some delete calls of a bulk action failed; the rest went through.
    ///
    /// Scripts should re-run the delete for the keys reported on stderr.
    PartialFailure = 7,

    /// Interrupted - SIGINT/Ctrl+C (Unix standard: 128 + 2).
    Interrupted = 130,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Unauthorized(_) => ExitCode::AuthenticationFailed,
            ClientError::ApiError { status: 401, .. } => ExitCode::AuthenticationFailed,

            ClientError::Forbidden(_) => ExitCode::PermissionDenied,
            ClientError::ApiError { status: 403, .. } => ExitCode::PermissionDenied,

            ClientError::Timeout(_) | ClientError::InvalidUrl(_) => ExitCode::ConnectionError,
            ClientError::MaxRetriesExceeded(_) => ExitCode::ConnectionError,
            ClientError::HttpError(e) if e.is_connect() || e.is_timeout() => {
                ExitCode::ConnectionError
            }

            ClientError::NotFound(_) => ExitCode::NotFound,
            ClientError::ApiError { status: 404, .. } => ExitCode::NotFound,

            ClientError::InvalidRequest(_) => ExitCode::ValidationError,
            ClientError::ApiError { status: 400, .. } => ExitCode::ValidationError,

            ClientError::HttpError(_)
            | ClientError::InvalidResponse(_)
            | ClientError::ApiError { .. } => ExitCode::GeneralError,
        }
    }
}

impl From<&BulkError> for ExitCode {
    fn from(err: &BulkError) -> Self {
        match err {
            BulkError::EmptySelection => ExitCode::ValidationError,
            BulkError::NotAuthorized { .. } => ExitCode::PermissionDenied,
        }
    }
}

/// Some partitions of a confirmed bulk delete failed.
#[derive(Debug, Error)]
#[error("{failed} of {total} rows could not be removed: {}", format_keys(.keys))]
pub struct PartialDeleteFailure {
    pub failed: usize,
    pub total: usize,
    pub keys: Vec<ResourceKey>,
}

/// A row key given on the command line matched no row of the table.
#[derive(Debug, Error)]
#[error("No {plural} match: {}", format_keys(.keys))]
pub struct UnknownKeys {
    pub plural: &'static str,
    pub keys: Vec<ResourceKey>,
}

fn format_keys(keys: &[ResourceKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if no known error is in the chain.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(client_err) = cause.downcast_ref::<ClientError>() {
                return ExitCode::from(client_err);
            }
            // Fetch errors are shared between subscribers.
            if let Some(client_err) = cause.downcast_ref::<Arc<ClientError>>() {
                return ExitCode::from(client_err.as_ref());
            }
            if let Some(bulk_err) = cause.downcast_ref::<BulkError>() {
                return ExitCode::from(bulk_err);
            }
            if cause.is::<PartialDeleteFailure>() {
                return ExitCode::PartialFailure;
            }
            if cause.is::<UnknownKeys>() {
                return ExitCode::NotFound;
            }
            if cause.is::<ValidationErrors>() {
                return ExitCode::ValidationError;
            }
        }

        ExitCode::GeneralError
    }
}
