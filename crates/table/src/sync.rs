//! Coalescing fetch state for one table's data source.
//!
//! Responsibilities:
//! - Run the fetch for a data source, never more than one at a time.
//! - Collapse refresh requests made during a fetch into a single follow-up fetch.
//! - Publish snapshots: the last good dataset, a loading flag, the last error.
//! - Keep a dataset's version when a refresh returns identical content.
//!
//! Does NOT handle:
//! - Deciding when to refresh (see [`crate::polling`] and the bulk controller).
//! - Deriving view rows (see [`crate::view_model`]).
//!
//! Invariants:
//! - At most one fetch per `ResourceSync` is in flight.
//! - A failed fetch never clears the previous dataset.
//! - Once closed, fetch results that arrive are discarded and nothing is published.

use std::fmt;
use std::sync::{Arc, Mutex};

use fleetdeck_client::{ClientError, ListFilter, Namespace, Resource, ResourceApi, ResourceKind, Workload};
use futures::future::BoxFuture;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type FetchFn<T> = dyn Fn() -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync;

/// A dataset plus the version it was published under.
///
/// Versions increase only when content changes, so equal versions mean
/// equal content and consumers can key caches and selection on them.
#[derive(Debug)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: Arc<T>,
}

impl<T> Clone for Versioned<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            value: Arc::clone(&self.value),
        }
    }
}

/// What a view renders from: last good data, loading flag, last error.
#[derive(Debug)]
pub struct SyncSnapshot<T> {
    pub data: Option<Versioned<T>>,
    /// True until the first fetch completes, successfully or not.
    pub loading: bool,
    pub error: Option<Arc<ClientError>>,
}

impl<T> Clone for SyncSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

impl<T> SyncSnapshot<T> {
    pub fn version(&self) -> Option<u64> {
        self.data.as_ref().map(|d| d.version)
    }
}

#[derive(Debug, Default)]
struct RunState {
    in_flight: bool,
    rerun: bool,
    started: u64,
}

struct Inner<T> {
    label: String,
    fetch: Box<FetchFn<T>>,
    run: Mutex<RunState>,
    snapshot: watch::Sender<SyncSnapshot<T>>,
    completed: watch::Sender<u64>,
    closed: CancellationToken,
}

/// Owner of a data source's fetch state. Dropping it closes the source.
pub struct ResourceSync<T> {
    inner: Arc<Inner<T>>,
}

/// Cloneable handle that can request refreshes without keeping the source open.
pub struct Refresher<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Refresher<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ResourceSync<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSync")
            .field("label", &self.inner.label)
            .field("closed", &self.inner.closed.is_cancelled())
            .finish()
    }
}

impl<T> fmt::Debug for Refresher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refresher").field("label", &self.inner.label).finish()
    }
}

impl<T> ResourceSync<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    /// Create a source over an arbitrary fetch function. Nothing is fetched
    /// until [`ResourceSync::refresh`] is called.
    pub fn new<F>(label: impl Into<String>, fetch: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ClientError>> + Send + Sync + 'static,
    {
        let (snapshot, _) = watch::channel(SyncSnapshot {
            data: None,
            loading: true,
            error: None,
        });
        let (completed, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                label: label.into(),
                fetch: Box::new(fetch),
                run: Mutex::new(RunState::default()),
                snapshot,
                completed,
                closed: CancellationToken::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> SyncSnapshot<T> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot<T>> {
        self.inner.snapshot.subscribe()
    }

    pub fn refresher(&self) -> Refresher<T> {
        Refresher {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Request a refresh; the returned future resolves once a fetch that
    /// started after this request has completed, or the source is closed.
    pub fn refresh(&self) -> BoxFuture<'static, ()> {
        request_refresh(&self.inner)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    /// Stop publishing. In-flight fetches finish but their results are dropped.
    pub fn close(&self) {
        if !self.inner.closed.is_cancelled() {
            debug!(source = %self.inner.label, "Closing resource sync");
            self.inner.closed.cancel();
        }
    }
}

impl<T> Drop for ResourceSync<T> {
    fn drop(&mut self) {
        self.inner.closed.cancel();
    }
}

impl<T> Refresher<T>
where
    T: PartialEq + Send + Sync + 'static,
{
    pub fn refresh(&self) -> BoxFuture<'static, ()> {
        request_refresh(&self.inner)
    }
}

impl ResourceSync<Vec<Resource>> {
    /// Source listing every resource of `kind`.
    pub fn resources<A: ResourceApi>(api: Arc<A>, kind: ResourceKind, filter: ListFilter) -> Self {
        Self::new(kind.as_str(), move || {
            let api = Arc::clone(&api);
            let filter = filter.clone();
            Box::pin(async move { api.list(kind, &filter).await })
        })
    }
}

impl ResourceSync<Vec<Workload>> {
    pub fn workloads<A: ResourceApi>(api: Arc<A>) -> Self {
        Self::new("workloads", move || {
            let api = Arc::clone(&api);
            Box::pin(async move { api.list_workloads().await })
        })
    }
}

impl ResourceSync<Vec<Namespace>> {
    pub fn namespaces<A: ResourceApi>(api: Arc<A>) -> Self {
        Self::new("namespaces", move || {
            let api = Arc::clone(&api);
            Box::pin(async move { api.list_namespaces().await })
        })
    }
}

fn request_refresh<T>(inner: &Arc<Inner<T>>) -> BoxFuture<'static, ()>
where
    T: PartialEq + Send + Sync + 'static,
{
    let mut completed = inner.completed.subscribe();
    let closed = inner.closed.clone();

    let target = {
        let mut run = inner.run.lock().unwrap_or_else(|e| e.into_inner());
        if closed.is_cancelled() {
            None
        } else if run.in_flight {
            run.rerun = true;
            debug!(source = %inner.label, "Fetch in flight, queueing one follow-up");
            Some(run.started + 1)
        } else {
            run.in_flight = true;
            run.started += 1;
            tokio::spawn(fetch_loop(Arc::clone(inner)));
            Some(run.started)
        }
    };

    Box::pin(async move {
        let Some(target) = target else {
            return;
        };
        let reached = async {
            while *completed.borrow_and_update() < target {
                if completed.changed().await.is_err() {
                    break;
                }
            }
        };
        tokio::select! {
            _ = reached => {}
            _ = closed.cancelled() => {}
        }
    })
}

async fn fetch_loop<T>(inner: Arc<Inner<T>>)
where
    T: PartialEq + Send + Sync + 'static,
{
    loop {
        let result = (inner.fetch)().await;

        if inner.closed.is_cancelled() {
            debug!(source = %inner.label, "Discarding fetch result after close");
        } else {
            publish(&inner, result);
        }
        inner.completed.send_modify(|done| *done += 1);

        let mut run = inner.run.lock().unwrap_or_else(|e| e.into_inner());
        if run.rerun && !inner.closed.is_cancelled() {
            run.rerun = false;
            run.started += 1;
            continue;
        }
        run.in_flight = false;
        run.rerun = false;
        break;
    }
}

fn publish<T: PartialEq>(inner: &Inner<T>, result: Result<T, ClientError>) {
    inner.snapshot.send_modify(|snap| {
        snap.loading = false;
        match result {
            Ok(value) => {
                snap.error = None;
                let unchanged = snap.data.as_ref().is_some_and(|d| *d.value == value);
                if unchanged {
                    debug!(source = %inner.label, "Fetch returned unchanged data");
                } else {
                    let version = snap.data.as_ref().map_or(1, |d| d.version + 1);
                    debug!(source = %inner.label, version, "Publishing new dataset");
                    snap.data = Some(Versioned {
                        version,
                        value: Arc::new(value),
                    });
                }
            }
            Err(e) => {
                warn!(source = %inner.label, error = %e, "Fetch failed, keeping last dataset");
                snap.error = Some(Arc::new(e));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_source(
        delay: Duration,
        values: Vec<Result<Vec<u32>, ClientError>>,
    ) -> (Arc<AtomicUsize>, ResourceSync<Vec<u32>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let values = Arc::new(Mutex::new(values.into_iter()));
        let c = calls.clone();
        let sync = ResourceSync::new("test", move || {
            c.fetch_add(1, Ordering::SeqCst);
            let next = values.lock().unwrap().next();
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                next.unwrap_or_else(|| Ok(vec![]))
            })
        });
        (calls, sync)
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_during_fetch_coalesce_into_one_rerun() {
        let (calls, sync) = counting_source(
            Duration::from_secs(2),
            vec![Ok(vec![1]), Ok(vec![1, 2]), Ok(vec![9])],
        );

        let first = sync.refresh();
        let second = sync.refresh();
        let third = sync.refresh();
        futures::join!(first, second, third);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let snap = sync.snapshot();
        assert_eq!(*snap.data.unwrap().value, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_content_keeps_version() {
        let (_calls, sync) = counting_source(
            Duration::from_millis(10),
            vec![Ok(vec![1]), Ok(vec![1]), Ok(vec![2])],
        );
        sync.refresh().await;
        assert_eq!(sync.snapshot().version(), Some(1));
        sync.refresh().await;
        assert_eq!(sync.snapshot().version(), Some(1));
        sync.refresh().await;
        assert_eq!(sync.snapshot().version(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_keeps_last_good_dataset() {
        let (_calls, sync) = counting_source(
            Duration::from_millis(10),
            vec![
                Ok(vec![7]),
                Err(ClientError::Forbidden("nope".into())),
                Ok(vec![7]),
            ],
        );
        assert!(sync.snapshot().loading);
        sync.refresh().await;
        sync.refresh().await;

        let snap = sync.snapshot();
        assert!(!snap.loading);
        assert!(matches!(snap.error.as_deref(), Some(ClientError::Forbidden(_))));
        assert_eq!(*snap.data.as_ref().unwrap().value, vec![7]);

        sync.refresh().await;
        assert!(sync.snapshot().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_failure_ends_loading_without_data() {
        let (_calls, sync) = counting_source(
            Duration::from_millis(10),
            vec![Err(ClientError::Timeout(Duration::from_secs(30)))],
        );
        sync.refresh().await;
        let snap = sync.snapshot();
        assert!(!snap.loading);
        assert!(snap.data.is_none());
        assert!(snap.error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_after_close_are_discarded() {
        let (calls, sync) = counting_source(Duration::from_secs(5), vec![Ok(vec![1])]);
        let rx = sync.subscribe();
        let pending = sync.refresh();

        tokio::time::sleep(Duration::from_secs(1)).await;
        sync.close();
        pending.await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(rx.borrow().data.is_none());
        assert!(rx.borrow().loading);

        // Refreshing a closed source is a no-op.
        sync.refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
