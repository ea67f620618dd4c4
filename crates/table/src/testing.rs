//! In-memory test doubles for table controllers.
//!
//! Enabled for this crate's own tests and, through the `test-utils` feature,
//! for integration tests and downstream crates.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use fleetdeck_client::{
    ClientError, ListFilter, Namespace, Resource, ResourceApi, ResourceKey, ResourceKind, Workload,
};

use crate::notify::{Notification, NotificationSink, ToastLevel};

/// One recorded delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCall {
    pub kind: ResourceKind,
    pub keys: Vec<ResourceKey>,
}

#[derive(Debug, Default)]
struct MockState {
    resources: BTreeMap<ResourceKind, Vec<Resource>>,
    namespaces: Vec<Namespace>,
    workloads: Vec<Workload>,
    list_errors: VecDeque<ClientError>,
    workload_errors: VecDeque<ClientError>,
    failing_namespaces: BTreeSet<String>,
    failing_names: BTreeSet<String>,
    list_delay: Duration,
    list_calls: BTreeMap<ResourceKind, usize>,
    workload_calls: usize,
    namespace_calls: usize,
    deletes: Vec<DeleteCall>,
}

/// A [`ResourceApi`] backed by in-memory collections.
///
/// Successful deletes remove the targets, so a following list reflects them.
#[derive(Debug, Default)]
pub struct MockResourceApi {
    state: Mutex<MockState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockResourceApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_resources(self, kind: ResourceKind, resources: Vec<Resource>) -> Self {
        self.set_resources(kind, resources);
        self
    }

    pub fn with_namespaces(self, namespaces: Vec<Namespace>) -> Self {
        self.state().namespaces = namespaces;
        self
    }

    pub fn with_workloads(self, workloads: Vec<Workload>) -> Self {
        self.state().workloads = workloads;
        self
    }

    pub fn set_resources(&self, kind: ResourceKind, resources: Vec<Resource>) {
        self.state().resources.insert(kind, resources);
    }

    /// Every list call sleeps this long before answering.
    pub fn set_list_delay(&self, delay: Duration) {
        self.state().list_delay = delay;
    }

    /// The next list call fails with `error`. Queued errors are used in order.
    pub fn push_list_error(&self, error: ClientError) {
        self.state().list_errors.push_back(error);
    }

    pub fn push_workload_error(&self, error: ClientError) {
        self.state().workload_errors.push_back(error);
    }

    /// Deletes touching `namespace` fail with a 500.
    pub fn fail_deletes_in(&self, namespace: impl Into<String>) {
        self.state().failing_namespaces.insert(namespace.into());
    }

    /// Deletes touching a resource named `name` fail with a 500.
    pub fn fail_deletes_of(&self, name: impl Into<String>) {
        self.state().failing_names.insert(name.into());
    }

    pub fn list_calls(&self, kind: ResourceKind) -> usize {
        self.state().list_calls.get(&kind).copied().unwrap_or(0)
    }

    pub fn workload_calls(&self) -> usize {
        self.state().workload_calls
    }

    pub fn namespace_calls(&self) -> usize {
        self.state().namespace_calls
    }

    pub fn delete_calls(&self) -> Vec<DeleteCall> {
        self.state().deletes.clone()
    }

    /// Highest number of list calls that were running at the same time.
    pub fn max_concurrent_lists(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl ResourceApi for MockResourceApi {
    async fn list(
        &self,
        kind: ResourceKind,
        filter: &ListFilter,
    ) -> Result<Vec<Resource>, ClientError> {
        let delay = {
            let mut state = self.state();
            *state.list_calls.entry(kind).or_default() += 1;
            state.list_delay
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut state = self.state();
        if let Some(err) = state.list_errors.pop_front() {
            return Err(err);
        }
        let all = state.resources.get(&kind).cloned().unwrap_or_default();
        if filter.namespaces.is_empty() || !kind.is_namespaced() {
            return Ok(all);
        }
        Ok(all
            .into_iter()
            .filter(|r| {
                r.namespace
                    .as_ref()
                    .is_some_and(|ns| filter.namespaces.contains(ns))
            })
            .collect())
    }

    async fn delete(&self, kind: ResourceKind, targets: &[Resource]) -> Result<(), ClientError> {
        let mut state = self.state();
        let keys: Vec<ResourceKey> = targets.iter().map(|r| r.key(kind)).collect();
        state.deletes.push(DeleteCall {
            kind,
            keys: keys.clone(),
        });

        let rejected = targets.iter().find(|r| {
            state.failing_names.contains(&r.name)
                || r.namespace
                    .as_ref()
                    .is_some_and(|ns| state.failing_namespaces.contains(ns))
        });
        if let Some(r) = rejected {
            return Err(ClientError::ApiError {
                status: 500,
                url: format!("mock://{}", kind.as_str()),
                message: format!("cannot remove {}", r.key(kind)),
            });
        }

        if let Some(existing) = state.resources.get_mut(&kind) {
            existing.retain(|r| !keys.contains(&r.key(kind)));
        }
        Ok(())
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClientError> {
        let mut state = self.state();
        state.namespace_calls += 1;
        Ok(state.namespaces.clone())
    }

    async fn list_workloads(&self) -> Result<Vec<Workload>, ClientError> {
        let mut state = self.state();
        state.workload_calls += 1;
        if let Some(err) = state.workload_errors.pop_front() {
            return Err(err);
        }
        Ok(state.workloads.clone())
    }
}

/// Notification sink that keeps everything it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn with_level(&self, level: ToastLevel) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .collect()
    }

    pub fn successes(&self) -> Vec<Notification> {
        self.with_level(ToastLevel::Success)
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.with_level(ToastLevel::Error)
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}
