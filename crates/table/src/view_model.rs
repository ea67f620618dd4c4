//! Derived rows for list views.
//!
//! Responsibilities:
//! - Annotate raw resources with the in-use flag and system-namespace marker.
//! - Hide rows in system namespaces unless the session may and wants to see them.
//! - Sort rows by the table's sort settings.
//! - Memoize the result on the versions of its inputs.
//!
//! Does NOT handle:
//! - Fetching any of the inputs (see [`crate::sync`]).
//! - Selection state (see [`crate::selection`]).
//!
//! Invariants:
//! - While auxiliary data is loading every row reports `in_use = true`, so an
//!   "unused" marker never flashes before the workloads arrive.
//! - [`ViewModelBuilder::rows`] recomputes only when an input version or a
//!   flag changes; otherwise it returns the same `Arc`.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use fleetdeck_client::{Namespace, Resource, ResourceKey, ResourceKind, Workload};
use fleetdeck_config::{SortDirection, SortState};
use tracing::trace;

use crate::sync::Versioned;

/// Namespaces reserved by the platform regardless of what the API reports.
pub const DEFAULT_SYSTEM_NAMESPACES: [&str; 4] =
    ["kube-system", "kube-public", "kube-node-lease", "portainer"];

/// One annotated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRow {
    pub resource: Resource,
    pub key: ResourceKey,
    /// Whether a workload references this resource. Deleting an in-use
    /// resource should be warned about.
    pub in_use: bool,
    pub is_system: bool,
}

/// Set of `(namespace, name)` pairs referenced by workloads, per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageIndex {
    secrets: HashSet<(String, String)>,
    config_maps: HashSet<(String, String)>,
}

impl UsageIndex {
    pub fn from_workloads(workloads: &[Workload]) -> Self {
        let mut index = Self::default();
        for w in workloads {
            for name in &w.secret_refs {
                index.secrets.insert((w.namespace.clone(), name.clone()));
            }
            for name in &w.config_map_refs {
                index.config_maps.insert((w.namespace.clone(), name.clone()));
            }
        }
        index
    }

    pub fn is_used(&self, kind: ResourceKind, resource: &Resource) -> bool {
        let set = match kind {
            ResourceKind::KubeSecret => &self.secrets,
            ResourceKind::KubeConfigMap => &self.config_maps,
            _ => return false,
        };
        let Some(ns) = resource.namespace.as_deref() else {
            return false;
        };
        set.contains(&(ns.to_string(), resource.name.clone()))
    }
}

/// Names of system namespaces: the built-in list plus any the API flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemNamespaces {
    names: BTreeSet<String>,
}

impl Default for SystemNamespaces {
    fn default() -> Self {
        Self {
            names: DEFAULT_SYSTEM_NAMESPACES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SystemNamespaces {
    pub fn from_namespaces(namespaces: &[Namespace]) -> Self {
        let mut set = Self::default();
        set.names.extend(
            namespaces
                .iter()
                .filter(|ns| ns.is_system)
                .map(|ns| ns.name.clone()),
        );
        set
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.names.contains(namespace)
    }
}

/// Inputs to [`build`].
#[derive(Debug, Clone, Copy)]
pub struct BuildOptions<'a> {
    pub kind: ResourceKind,
    /// Workload usage, when loaded.
    pub usage: Option<&'a UsageIndex>,
    /// True while the workloads fetch has not completed.
    pub aux_loading: bool,
    pub system: &'a SystemNamespaces,
    /// `show_system_resources` AND the session may see system namespaces.
    pub show_system: bool,
    pub sort: &'a SortState,
}

/// Derive rows from raw resources. Pure; see [`ViewModelBuilder`] for caching.
pub fn build(raw: &[Resource], opts: BuildOptions<'_>) -> Vec<ResourceRow> {
    let mut rows: Vec<ResourceRow> = raw
        .iter()
        .filter_map(|resource| {
            let is_system = opts.kind.is_namespaced()
                && resource
                    .namespace
                    .as_deref()
                    .is_some_and(|ns| opts.system.contains(ns));
            if is_system && !opts.show_system {
                return None;
            }
            let in_use = if opts.aux_loading {
                true
            } else if opts.kind.tracks_usage() {
                // No usage data (fetch failed) is treated like loading.
                opts.usage.is_none_or(|u| u.is_used(opts.kind, resource))
            } else {
                false
            };
            Some(ResourceRow {
                key: resource.key(opts.kind),
                resource: resource.clone(),
                in_use,
                is_system,
            })
        })
        .collect();

    sort_rows(&mut rows, opts.sort);
    rows
}

/// Sort by `name`, `namespace`, `created`, or `type`; unknown columns sort by name.
pub fn sort_rows(rows: &mut [ResourceRow], sort: &SortState) {
    let by_name = |a: &ResourceRow, b: &ResourceRow| a.resource.name.cmp(&b.resource.name);
    rows.sort_by(|a, b| {
        let primary = match sort.column.as_str() {
            "namespace" => a.resource.namespace.cmp(&b.resource.namespace),
            "created" | "createdAt" | "creationDate" => {
                a.resource.created_at.cmp(&b.resource.created_at)
            }
            "type" => a.resource.resource_type.cmp(&b.resource.resource_type),
            _ => Ordering::Equal,
        };
        let ord = primary.then_with(|| by_name(a, b)).then_with(|| a.key.cmp(&b.key));
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Rows of page `page` (zero-based) at `page_size` rows per page.
pub fn page(rows: &[ResourceRow], page_size: u32, page: usize) -> &[ResourceRow] {
    let size = page_size.max(1) as usize;
    let start = page.saturating_mul(size).min(rows.len());
    let end = start.saturating_add(size).min(rows.len());
    &rows[start..end]
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    raw: u64,
    workloads: Option<u64>,
    namespaces: Option<u64>,
    aux_loading: bool,
    show_system: bool,
    sort: SortState,
}

/// Memoizing wrapper around [`build`] keyed on input versions.
#[derive(Debug)]
pub struct ViewModelBuilder {
    kind: ResourceKind,
    cached: Option<(MemoKey, Arc<Vec<ResourceRow>>)>,
    computations: u64,
}

/// Versioned inputs for one [`ViewModelBuilder::rows`] call.
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a> {
    pub raw: &'a Versioned<Vec<Resource>>,
    pub workloads: Option<&'a Versioned<Vec<Workload>>>,
    pub aux_loading: bool,
    pub namespaces: Option<&'a Versioned<Vec<Namespace>>>,
    pub show_system: bool,
    pub sort: &'a SortState,
}

impl ViewModelBuilder {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            cached: None,
            computations: 0,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Number of times rows were actually recomputed.
    pub fn computations(&self) -> u64 {
        self.computations
    }

    pub fn rows(&mut self, inputs: ViewInputs<'_>) -> Arc<Vec<ResourceRow>> {
        let key = MemoKey {
            raw: inputs.raw.version,
            workloads: inputs.workloads.map(|w| w.version),
            namespaces: inputs.namespaces.map(|n| n.version),
            aux_loading: inputs.aux_loading,
            show_system: inputs.show_system,
            sort: inputs.sort.clone(),
        };
        if let Some((cached_key, rows)) = &self.cached
            && *cached_key == key
        {
            return Arc::clone(rows);
        }

        let usage = inputs
            .workloads
            .map(|w| UsageIndex::from_workloads(&w.value));
        let system = inputs
            .namespaces
            .map(|n| SystemNamespaces::from_namespaces(&n.value))
            .unwrap_or_default();
        let rows = Arc::new(build(
            &inputs.raw.value,
            BuildOptions {
                kind: self.kind,
                usage: usage.as_ref(),
                aux_loading: inputs.aux_loading,
                system: &system,
                show_system: inputs.show_system,
                sort: inputs.sort,
            },
        ));
        self.computations += 1;
        trace!(kind = %self.kind, rows = rows.len(), "Rebuilt view model");
        self.cached = Some((key, Arc::clone(&rows)));
        rows
    }
}
