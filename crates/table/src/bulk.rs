//! Confirmed bulk delete of selected rows.
//!
//! Responsibilities:
//! - Gate the delete action on authorization and a non-empty selection.
//! - Produce the confirmation prompt for the selected rows.
//! - Partition the selection per [`PartitionPolicy`] and delete partition by
//!   partition, sequentially.
//! - Report outcomes through the notification sink and update the selection.
//!
//! Does NOT handle:
//! - Prompting the user (callers show [`PendingDelete::message`] and decide).
//! - Retrying failed partitions (the user re-triggers).
//!
//! Invariants:
//! - Each partition succeeds or fails as a unit. A failed partition never
//!   clears its rows from the selection; a succeeded one always does.
//! - Kinds whose endpoint deletes one key per call are always partitioned per
//!   key, whatever policy is configured.
//! - A re-fetch is requested only when every partition succeeded, so a
//!   partial failure leaves the failing rows selected for retry.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use fleetdeck_client::{
    ClientError, DeleteStyle, Resource, ResourceApi, ResourceKey, ResourceKind,
};
use tracing::{debug, info, warn};

use crate::auth::{ActionState, Authorizations};
use crate::environment::EnvironmentContext;
use crate::notify::NotificationSink;
use crate::selection::Selection;
use crate::sync::Refresher;
use crate::view_model::ResourceRow;

/// How selected rows are grouped into delete calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionPolicy {
    /// Everything in one call.
    SingleBatch,
    /// One call per namespace. Non-namespaced kinds behave like `SingleBatch`.
    PerNamespace,
    /// One call per row.
    PerKey,
}

impl PartitionPolicy {
    /// Granularity matching what each backend endpoint accepts natively.
    pub fn default_for(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::KubeSecret | ResourceKind::KubeConfigMap => Self::SingleBatch,
            ResourceKind::KubeIngress => Self::PerNamespace,
            ResourceKind::DockerSecret | ResourceKind::DockerConfig => Self::PerKey,
            ResourceKind::Environment => Self::SingleBatch,
        }
    }

    /// The policy actually applied to `kind`.
    ///
    /// A per-key endpoint cannot delete a group atomically, so grouping its
    /// keys would misreport keys removed before a failure.
    pub fn effective_for(self, kind: ResourceKind) -> Self {
        match kind.delete_style() {
            DeleteStyle::PerKey => Self::PerKey,
            _ => self,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SingleBatch => "single",
            Self::PerNamespace => "per-namespace",
            Self::PerKey => "per-key",
        }
    }
}

impl fmt::Display for PartitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" | "single-batch" => Ok(Self::SingleBatch),
            "per-namespace" => Ok(Self::PerNamespace),
            "per-key" => Ok(Self::PerKey),
            other => Err(format!(
                "unknown partition policy '{other}' (expected single, per-namespace or per-key)"
            )),
        }
    }
}

/// What one delete call covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionScope {
    All,
    Namespace(String),
    Key(ResourceKey),
}

#[derive(Debug, Clone)]
pub struct Partition {
    pub scope: PartitionScope,
    pub rows: Vec<ResourceRow>,
}

impl Partition {
    pub fn keys(&self) -> Vec<ResourceKey> {
        self.rows.iter().map(|r| r.key.clone()).collect()
    }
}

/// Group `rows` into delete partitions. Order is deterministic.
pub fn partition_rows(
    kind: ResourceKind,
    policy: PartitionPolicy,
    rows: Vec<ResourceRow>,
) -> Vec<Partition> {
    if rows.is_empty() {
        return Vec::new();
    }
    match policy.effective_for(kind) {
        PartitionPolicy::PerNamespace if kind.is_namespaced() => {
            let mut groups: BTreeMap<String, Vec<ResourceRow>> = BTreeMap::new();
            for row in rows {
                let ns = row.resource.namespace.clone().unwrap_or_default();
                groups.entry(ns).or_default().push(row);
            }
            groups
                .into_iter()
                .map(|(ns, rows)| Partition {
                    scope: PartitionScope::Namespace(ns),
                    rows,
                })
                .collect()
        }
        PartitionPolicy::PerKey => rows
            .into_iter()
            .map(|row| Partition {
                scope: PartitionScope::Key(row.key.clone()),
                rows: vec![row],
            })
            .collect(),
        PartitionPolicy::SingleBatch | PartitionPolicy::PerNamespace => vec![Partition {
            scope: PartitionScope::All,
            rows,
        }],
    }
}

/// `"1 secret"`, `"2 secrets"`, `"3 ingresses"`.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else if noun.ends_with('s') {
        format!("{count} {noun}es")
    } else {
        format!("{count} {noun}s")
    }
}

pub fn confirm_message(kind: ResourceKind, count: usize) -> String {
    format!(
        "Are you sure you want to remove the selected {}?",
        pluralize(count, kind.noun())
    )
}

fn failure_message(kind: ResourceKind, scope: &PartitionScope, error: &ClientError) -> String {
    let error = error.user_message();
    match scope {
        PartitionScope::All => format!("Unable to remove {}: {error}", kind.plural()),
        PartitionScope::Namespace(ns) => {
            format!("Unable to remove {} in {ns}: {error}", kind.plural())
        }
        PartitionScope::Key(key) => format!("Unable to remove {} {key}: {error}", kind.noun()),
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BulkError {
    #[error("no rows are selected")]
    EmptySelection,

    #[error("removing {plural} requires the {scope} authorization")]
    NotAuthorized {
        scope: &'static str,
        plural: &'static str,
    },
}

/// A delete awaiting the user's confirmation. Dropping it cancels.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    kind: ResourceKind,
    rows: Vec<ResourceRow>,
    message: String,
}

impl PendingDelete {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn rows(&self) -> &[ResourceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Confirmation prompt text.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn in_use_count(&self) -> usize {
        self.rows.iter().filter(|r| r.in_use).count()
    }

    /// Extra warning when workloads still reference some of the rows.
    pub fn in_use_warning(&self) -> Option<String> {
        if !self.kind.tracks_usage() {
            return None;
        }
        match self.in_use_count() {
            0 => None,
            n => Some(format!(
                "{} still referenced by running workloads.",
                if n == 1 {
                    format!("1 selected {} is", self.kind.noun())
                } else {
                    format!("{n} selected {} are", self.kind.plural())
                }
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PartitionFailure {
    pub scope: PartitionScope,
    pub keys: Vec<ResourceKey>,
    pub error: Arc<ClientError>,
    pub message: String,
}

/// Outcome of a confirmed bulk delete.
#[derive(Debug, Clone, Default)]
pub struct BulkReport {
    pub removed: Vec<ResourceKey>,
    pub failures: Vec<PartitionFailure>,
    /// Whether a re-fetch was requested.
    pub refreshed: bool,
}

impl BulkReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty() && !self.removed.is_empty()
    }

    pub fn failed_keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.failures.iter().flat_map(|f| f.keys.iter())
    }
}

/// Bulk delete controller for one table.
pub struct BulkDeleteController<A> {
    api: Arc<A>,
    kind: ResourceKind,
    policy: PartitionPolicy,
    auth: Authorizations,
    notifier: Arc<dyn NotificationSink>,
    refresher: Option<Refresher<Vec<Resource>>>,
    environments: Option<Arc<EnvironmentContext>>,
}

impl<A> fmt::Debug for BulkDeleteController<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkDeleteController")
            .field("kind", &self.kind)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<A: ResourceApi> BulkDeleteController<A> {
    pub fn new(
        api: Arc<A>,
        kind: ResourceKind,
        auth: Authorizations,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            api,
            kind,
            policy: PartitionPolicy::default_for(kind),
            auth,
            notifier,
            refresher: None,
            environments: None,
        }
    }

    pub fn with_policy(mut self, policy: PartitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Source to re-fetch after a fully successful delete.
    pub fn with_refresher(mut self, refresher: Refresher<Vec<Resource>>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn with_environment_context(mut self, ctx: Arc<EnvironmentContext>) -> Self {
        self.environments = Some(ctx);
        self
    }

    /// Policy in force for this table's kind.
    pub fn policy(&self) -> PartitionPolicy {
        self.policy.effective_for(self.kind)
    }

    /// Whether the delete button is usable for `selection`.
    pub fn action_state(&self, selection: &Selection) -> ActionState {
        if selection.is_empty() {
            ActionState::Disabled
        } else {
            self.auth.delete_action(self.kind)
        }
    }

    /// Start a delete of the selected rows; the caller confirms or drops it.
    pub fn request(
        &self,
        selection: &Selection,
        rows: &[ResourceRow],
    ) -> Result<PendingDelete, BulkError> {
        if !self.auth.delete_action(self.kind).is_enabled() {
            return Err(BulkError::NotAuthorized {
                scope: self.kind.write_scope(),
                plural: self.kind.plural(),
            });
        }
        let selected: Vec<ResourceRow> = selection
            .selected_rows(rows)
            .into_iter()
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(BulkError::EmptySelection);
        }
        Ok(PendingDelete {
            kind: self.kind,
            message: confirm_message(self.kind, selected.len()),
            rows: selected,
        })
    }

    /// Execute a confirmed delete.
    pub async fn confirm(&self, pending: PendingDelete, selection: &mut Selection) -> BulkReport {
        let kind = pending.kind;
        let partitions = partition_rows(kind, self.policy, pending.rows);
        debug!(
            kind = %kind,
            policy = %self.policy(),
            partitions = partitions.len(),
            "Executing bulk delete"
        );

        let mut report = BulkReport::default();
        let mut removed_names = Vec::new();
        let mut removed_ids = Vec::new();

        // Sequential so each failure is attributable to exactly one partition.
        for partition in partitions {
            let keys = partition.keys();
            let targets: Vec<Resource> = partition.rows.iter().map(|r| r.resource.clone()).collect();
            match self.api.delete(kind, &targets).await {
                Ok(()) => {
                    selection.remove_keys(&keys);
                    removed_names.extend(targets.iter().map(|r| r.name.clone()));
                    removed_ids.extend(targets.iter().filter_map(|r| r.id.parse::<u64>().ok()));
                    report.removed.extend(keys);
                }
                Err(e) => {
                    let message = failure_message(kind, &partition.scope, &e);
                    warn!(kind = %kind, error = %e, "Bulk delete partition failed");
                    self.notifier.notify_error("Failure", &message);
                    report.failures.push(PartitionFailure {
                        scope: partition.scope,
                        keys,
                        error: Arc::new(e),
                        message,
                    });
                }
            }
        }

        if !report.removed.is_empty() {
            info!(kind = %kind, count = report.removed.len(), "Resources removed");
            self.notifier.notify_success(
                &format!("{} successfully removed", kind.title()),
                &removed_names.join(", "),
            );
            if kind == ResourceKind::Environment
                && let Some(ctx) = &self.environments
            {
                ctx.forget_if_removed(&removed_ids);
            }
        }

        if report.is_success() {
            selection.clear();
            if let Some(refresher) = &self.refresher {
                // The fetch is spawned on request; completion is observed via the sync.
                drop(refresher.refresh());
                report.refreshed = true;
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ns: Option<&str>, name: &str, kind: ResourceKind) -> ResourceRow {
        let mut resource = Resource::new(name);
        resource.namespace = ns.map(str::to_string);
        ResourceRow {
            key: resource.key(kind),
            resource,
            in_use: false,
            is_system: false,
        }
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "secret"), "1 secret");
        assert_eq!(pluralize(2, "secret"), "2 secrets");
        assert_eq!(pluralize(0, "ConfigMap"), "0 ConfigMaps");
        assert_eq!(pluralize(3, "ingress"), "3 ingresses");
    }

    #[test]
    fn test_confirm_message() {
        assert_eq!(
            confirm_message(ResourceKind::KubeSecret, 2),
            "Are you sure you want to remove the selected 2 secrets?"
        );
        assert_eq!(
            confirm_message(ResourceKind::Environment, 1),
            "Are you sure you want to remove the selected 1 environment?"
        );
    }

    #[test]
    fn test_partition_per_namespace_groups_and_orders() {
        let kind = ResourceKind::KubeIngress;
        let rows = vec![
            row(Some("web"), "a", kind),
            row(Some("api"), "b", kind),
            row(Some("web"), "c", kind),
        ];
        let parts = partition_rows(kind, PartitionPolicy::PerNamespace, rows);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].scope, PartitionScope::Namespace("api".into()));
        assert_eq!(parts[1].rows.len(), 2);
    }

    #[test]
    fn test_per_namespace_on_global_kind_is_single_batch() {
        let kind = ResourceKind::Environment;
        let rows = vec![row(None, "a", kind), row(None, "b", kind)];
        let parts = partition_rows(kind, PartitionPolicy::PerNamespace, rows);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].scope, PartitionScope::All);
    }

    #[test]
    fn test_per_key_partitions() {
        let kind = ResourceKind::DockerSecret;
        let rows = vec![row(None, "a", kind), row(None, "b", kind)];
        let parts = partition_rows(kind, PartitionPolicy::PerKey, rows);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].scope, PartitionScope::Key(ResourceKey::global("b")));
    }

    #[test]
    fn test_per_key_kinds_ignore_grouping_policies() {
        for kind in [ResourceKind::DockerSecret, ResourceKind::DockerConfig] {
            for policy in [
                PartitionPolicy::SingleBatch,
                PartitionPolicy::PerNamespace,
                PartitionPolicy::PerKey,
            ] {
                let rows = vec![row(None, "a", kind), row(None, "b", kind)];
                let parts = partition_rows(kind, policy, rows);
                assert_eq!(parts.len(), 2, "{kind} with {policy}");
                assert_eq!(parts[0].scope, PartitionScope::Key(ResourceKey::global("a")));
                assert_eq!(policy.effective_for(kind), PartitionPolicy::PerKey);
            }
        }
        assert_eq!(
            PartitionPolicy::SingleBatch.effective_for(ResourceKind::KubeIngress),
            PartitionPolicy::SingleBatch
        );
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("single".parse(), Ok(PartitionPolicy::SingleBatch));
        assert_eq!("per-namespace".parse(), Ok(PartitionPolicy::PerNamespace));
        assert!("sometimes".parse::<PartitionPolicy>().is_err());
    }

    #[test]
    fn test_failure_messages() {
        let err = ClientError::Forbidden("denied".into());
        assert_eq!(
            failure_message(
                ResourceKind::KubeIngress,
                &PartitionScope::Namespace("shop".into()),
                &err
            ),
            "Unable to remove ingresses in shop: Forbidden: denied"
        );
        assert_eq!(
            failure_message(
                ResourceKind::DockerConfig,
                &PartitionScope::Key(ResourceKey::global("nginx.conf")),
                &err
            ),
            "Unable to remove config nginx.conf: Forbidden: denied"
        );
    }

    #[test]
    fn test_in_use_warning() {
        let kind = ResourceKind::KubeConfigMap;
        let mut used = row(Some("default"), "app-config", kind);
        used.in_use = true;
        let pending = PendingDelete {
            kind,
            rows: vec![used, row(Some("default"), "old", kind)],
            message: String::new(),
        };
        assert_eq!(
            pending.in_use_warning().as_deref(),
            Some("1 selected ConfigMap is still referenced by running workloads.")
        );
    }
}
