//! Interval-driven refresh scheduling.
//!
//! Responsibilities:
//! - Invoke a refresh callback at the configured cadence while a view is mounted.
//! - React to interval changes immediately, including switching polling off.
//! - Stop all scheduling on teardown.
//!
//! Does NOT handle:
//! - Fetching or coalescing (see [`crate::sync`]); the callback only has to
//!   return a future that resolves when its refresh has finished.
//!
//! Invariants:
//! - At most one callback invocation is pending at any time; the next tick is
//!   scheduled only after the previous invocation completes.
//! - An interval of `None` (auto-refresh rate 0) schedules nothing.
//! - After [`Repeater::stop`] or drop, the callback is never invoked again.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Background task that calls a refresh callback on an interval.
#[derive(Debug)]
pub struct Repeater {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Repeater {
    /// Start polling on a runtime task.
    ///
    /// The first invocation happens one full interval after start; the initial
    /// load is the owner's responsibility.
    pub fn spawn<F, Fut>(interval: watch::Receiver<Option<Duration>>, refresh: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(interval, refresh, cancel.clone()));
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Poll at a fixed interval that never changes.
    pub fn fixed<F, Fut>(period: Duration, refresh: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (_tx, rx) = watch::channel(Some(period));
        Self::spawn(rx, refresh)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop scheduling and wait for the task to exit.
    ///
    /// A callback that is pending when this is called is abandoned; work it
    /// spawned elsewhere is not aborted.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Repeater {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<F, Fut>(
    mut interval: watch::Receiver<Option<Duration>>,
    mut refresh: F,
    cancel: CancellationToken,
) where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    // Once the sender is gone the last interval stays in force.
    let mut watching = true;

    loop {
        let period = *interval.borrow_and_update();

        let changed = async {
            if watching {
                interval.changed().await.is_ok()
            } else {
                std::future::pending().await
            }
        };

        let tick = async {
            match period {
                Some(p) => tokio::time::sleep(p).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            still_open = changed => {
                if !still_open {
                    watching = false;
                }
                debug!(?period, "Refresh interval changed, rescheduling");
                continue;
            }
            _ = tick => {}
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = refresh() => {}
        }
    }

    debug!("Repeater stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> std::future::Ready<()> + Send + 'static) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        (calls, move || {
            c.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_ticks() {
        let (calls, refresh) = counter();
        let repeater = Repeater::fixed(Duration::from_secs(10), refresh);

        tokio::time::sleep(Duration::from_millis(35_500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(repeater.is_running());

        repeater.stop().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_scheduling() {
        let (calls, refresh) = counter();
        let repeater = Repeater::fixed(Duration::from_secs(1), refresh);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        drop(repeater);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_reschedules_immediately() {
        let (tx, rx) = watch::channel(Some(Duration::from_secs(300)));
        let (calls, refresh) = counter();
        let _repeater = Repeater::spawn(rx, refresh);

        tokio::time::sleep(Duration::from_secs(5)).await;
        tx.send_replace(Some(Duration::from_secs(10)));
        // New period counts from the change, not from the original start.
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
