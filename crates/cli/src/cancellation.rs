//! CLI cancellation utilities.
//!
//! Responsibilities:
//! - Define a single, recognizable `Cancelled` error used to signal user-initiated
//!   cancellation (Ctrl+C/SIGINT) through `anyhow::Result`.
//! - Race a command future against the shared cancellation token.
//!
//! Does NOT handle:
//! - Installing the signal handler (see `main`).
//! - Deciding *when* a command may be interrupted; callers wrap only the awaits
//!   that are safe to abandon.
//!
//! Invariants:
//! - Once cancelled, the token remains cancelled forever.

use std::fmt;
use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Marker error used to indicate user-driven cancellation.
#[derive(Debug, Clone, Copy)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Returns true if this anyhow error represents a cancellation.
pub fn is_cancelled_error(err: &anyhow::Error) -> bool {
    err.is::<Cancelled>()
}

/// Print standard cancellation message to stderr.
pub fn print_cancelled_message() {
    eprintln!("^C\nOperation cancelled by user");
}

/// Run `fut` to completion unless `cancel` fires first.
pub async fn or_cancelled<F, T>(cancel: &CancellationToken, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        out = fut => Ok(out),
        _ = cancel.cancelled() => Err(Cancelled.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_recognized_through_context() {
        let err = anyhow::Error::from(Cancelled);
        assert!(is_cancelled_error(&err));
        assert!(!is_cancelled_error(&anyhow::anyhow!("boom")));
    }

    #[tokio::test]
    async fn test_or_cancelled_returns_output_when_not_cancelled() {
        let cancel = CancellationToken::new();
        assert_eq!(or_cancelled(&cancel, async { 7 }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_or_cancelled_stops_pending_future() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = or_cancelled(&cancel, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(is_cancelled_error(&err));
    }
}
