//! One mounted resource table, wired end to end.
//!
//! Responsibilities:
//! - Bind a table's persisted settings at mount.
//! - Own the data sources (resources, plus workloads and namespaces where the
//!   kind needs them) and the poller that refreshes them.
//! - Derive memoized rows and keep the selection in step with the dataset.
//! - Route bulk delete through authorization, confirmation and notification.
//!
//! Does NOT handle:
//! - Rendering or prompting; callers decide how rows and prompts are shown.
//!
//! Invariants:
//! - After [`ResourceTable::unmount`] no source publishes and no poll fires.

use std::fmt;
use std::sync::Arc;

use fleetdeck_client::{ListFilter, Namespace, Resource, ResourceApi, ResourceKind, Workload};
use fleetdeck_config::{InvalidTableId, SettingsStore, TableId};
use futures::future::{BoxFuture, join_all};
use tracing::debug;

use crate::auth::{ActionState, Authorizations};
use crate::bulk::{BulkDeleteController, BulkError, BulkReport, PartitionPolicy, PendingDelete};
use crate::environment::EnvironmentContext;
use crate::notify::NotificationSink;
use crate::polling::Repeater;
use crate::selection::Selection;
use crate::settings::TableState;
use crate::sync::{ResourceSync, SyncSnapshot};
use crate::view_model::{self, ResourceRow, ViewInputs, ViewModelBuilder};

/// Session-wide collaborators shared by every table.
#[derive(Clone)]
pub struct TableContext {
    pub store: Arc<SettingsStore>,
    pub auth: Authorizations,
    pub notifier: Arc<dyn NotificationSink>,
    pub environments: Arc<EnvironmentContext>,
}

impl fmt::Debug for TableContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableContext")
            .field("store", &self.store)
            .field("auth", &self.auth)
            .field("environments", &self.environments)
            .finish_non_exhaustive()
    }
}

/// Settings key a kind's table persists under.
pub fn table_id(kind: ResourceKind) -> Result<TableId, InvalidTableId> {
    TableId::new(kind.table_key())
}

pub struct ResourceTable<A> {
    kind: ResourceKind,
    state: TableState,
    auth: Authorizations,
    resources: ResourceSync<Vec<Resource>>,
    workloads: Option<ResourceSync<Vec<Workload>>>,
    namespaces: Option<ResourceSync<Vec<Namespace>>>,
    builder: ViewModelBuilder,
    selection: Selection,
    bulk: BulkDeleteController<A>,
    poller: Option<Repeater>,
}

impl<A> fmt::Debug for ResourceTable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceTable")
            .field("kind", &self.kind)
            .field("table_id", self.state.id())
            .field("selected", &self.selection.len())
            .field("polling", &self.poller.is_some())
            .finish_non_exhaustive()
    }
}

impl<A: ResourceApi> ResourceTable<A> {
    /// Mount a table. Nothing is fetched until [`ResourceTable::load`] or the
    /// first poll.
    pub fn mount(
        api: Arc<A>,
        kind: ResourceKind,
        filter: ListFilter,
        ctx: &TableContext,
    ) -> Result<Self, InvalidTableId> {
        let state = TableState::new(Arc::clone(&ctx.store), table_id(kind)?);
        let resources = ResourceSync::resources(Arc::clone(&api), kind, filter);
        let workloads = kind
            .tracks_usage()
            .then(|| ResourceSync::workloads(Arc::clone(&api)));
        let namespaces = kind
            .is_namespaced()
            .then(|| ResourceSync::namespaces(Arc::clone(&api)));

        let bulk = BulkDeleteController::new(api, kind, ctx.auth.clone(), Arc::clone(&ctx.notifier))
            .with_refresher(resources.refresher())
            .with_environment_context(Arc::clone(&ctx.environments));

        debug!(table_id = %state.id(), kind = %kind, "Mounted table");
        Ok(Self {
            kind,
            selection: Selection::new(kind, ctx.auth.selection_mode(kind)),
            builder: ViewModelBuilder::new(kind),
            auth: ctx.auth.clone(),
            state,
            resources,
            workloads,
            namespaces,
            bulk,
            poller: None,
        })
    }

    pub fn with_partition_policy(mut self, policy: PartitionPolicy) -> Self {
        self.bulk = self.bulk.with_policy(policy);
        self
    }

    pub fn partition_policy(&self) -> PartitionPolicy {
        self.bulk.policy()
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn settings(&self) -> &TableState {
        &self.state
    }

    /// Refresh every source; resolves when all of them have completed.
    pub fn refresh(&self) -> BoxFuture<'static, ()> {
        let mut pending = vec![self.resources.refresh()];
        pending.extend(self.workloads.as_ref().map(|s| s.refresh()));
        pending.extend(self.namespaces.as_ref().map(|s| s.refresh()));
        Box::pin(async move {
            join_all(pending).await;
        })
    }

    /// Initial load.
    pub async fn load(&self) {
        self.refresh().await;
    }

    /// Poll at the table's auto-refresh rate, following later rate changes.
    pub fn start_polling(&mut self) {
        if self.poller.is_some() {
            return;
        }
        let resources = self.resources.refresher();
        let workloads = self.workloads.as_ref().map(|s| s.refresher());
        let namespaces = self.namespaces.as_ref().map(|s| s.refresher());
        self.poller = Some(Repeater::spawn(self.state.refresh_interval(), move || {
            let mut pending = vec![resources.refresh()];
            pending.extend(workloads.as_ref().map(|r| r.refresh()));
            pending.extend(namespaces.as_ref().map(|r| r.refresh()));
            async move {
                join_all(pending).await;
            }
        }));
    }

    pub async fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(Repeater::is_running)
    }

    pub fn snapshot(&self) -> SyncSnapshot<Vec<Resource>> {
        self.resources.snapshot()
    }

    /// Subscribe to resource dataset changes.
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<SyncSnapshot<Vec<Resource>>> {
        self.resources.subscribe()
    }

    /// Current rows, or `None` before the first successful fetch.
    ///
    /// Also syncs the selection to the dataset version, clearing it when the
    /// content changed.
    pub fn rows(&mut self) -> Option<Arc<Vec<ResourceRow>>> {
        let raw = self.resources.snapshot().data?;
        let workloads = self.workloads.as_ref().map(|s| s.snapshot());
        let namespaces = self.namespaces.as_ref().map(|s| s.snapshot());
        let settings = self.state.settings();

        let rows = self.builder.rows(ViewInputs {
            raw: &raw,
            workloads: workloads.as_ref().and_then(|w| w.data.as_ref()),
            aux_loading: workloads.as_ref().is_some_and(|w| w.loading),
            namespaces: namespaces.as_ref().and_then(|n| n.data.as_ref()),
            show_system: settings.show_system_resources && self.auth.can_view_system_namespaces(),
            sort: &settings.sort,
        });
        self.selection.sync_dataset(raw.version);
        Some(rows)
    }

    /// Rows of page `page` (zero-based) at the table's page size.
    pub fn page(&mut self, page: usize) -> Vec<ResourceRow> {
        let page_size = self.state.settings().page_size;
        self.rows()
            .map(|rows| view_model::page(&rows, page_size, page).to_vec())
            .unwrap_or_default()
    }

    /// Times rows were recomputed rather than served from the memo.
    pub fn computations(&self) -> u64 {
        self.builder.computations()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    /// State of the delete action for the current dataset.
    ///
    /// Syncs the selection first, so a selection cleared by a changed
    /// dataset never enables the action.
    pub fn delete_action(&mut self) -> ActionState {
        if let Some(version) = self.resources.snapshot().version() {
            self.selection.sync_dataset(version);
        }
        self.bulk.action_state(&self.selection)
    }

    /// Begin deleting the selected rows.
    pub fn request_delete(&mut self) -> Result<PendingDelete, BulkError> {
        let rows = self.rows().unwrap_or_default();
        self.bulk.request(&self.selection, &rows)
    }

    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> BulkReport {
        self.bulk.confirm(pending, &mut self.selection).await
    }

    /// Tear down: stop polling and close every source.
    pub async fn unmount(mut self) {
        self.stop_polling().await;
        self.resources.close();
        if let Some(s) = &self.workloads {
            s.close();
        }
        if let Some(s) = &self.namespaces {
            s.close();
        }
        debug!(table_id = %self.state.id(), "Unmounted table");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::TracingNotifier;
    use crate::testing::MockResourceApi;

    fn ctx() -> TableContext {
        TableContext {
            store: Arc::new(SettingsStore::in_memory()),
            auth: Authorizations::unrestricted(),
            notifier: Arc::new(TracingNotifier),
            environments: Arc::new(EnvironmentContext::default()),
        }
    }

    #[test]
    fn test_table_ids_are_valid_for_every_kind() {
        for kind in ResourceKind::ALL {
            assert_eq!(table_id(kind).unwrap().as_str(), kind.table_key());
        }
    }

    #[tokio::test]
    async fn test_rows_absent_before_load() {
        let api = Arc::new(MockResourceApi::new().with_resources(
            ResourceKind::DockerConfig,
            vec![Resource::new("nginx.conf")],
        ));
        let mut table =
            ResourceTable::mount(api, ResourceKind::DockerConfig, ListFilter::all(), &ctx()).unwrap();
        assert!(table.rows().is_none());
        table.load().await;
        assert_eq!(table.rows().map(|r| r.len()), Some(1));
        table.unmount().await;
    }

    #[tokio::test]
    async fn test_docker_kind_skips_auxiliary_sources() {
        let api = Arc::new(MockResourceApi::new());
        let table = ResourceTable::mount(
            Arc::clone(&api),
            ResourceKind::DockerSecret,
            ListFilter::all(),
            &ctx(),
        )
        .unwrap();
        table.load().await;
        assert_eq!(api.workload_calls(), 0);
        assert_eq!(api.namespace_calls(), 0);
    }
}
