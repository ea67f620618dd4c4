//! Row selection for one mounted table.
//!
//! Responsibilities:
//! - Track checked rows by [`ResourceKey`].
//! - Enforce selectability: view-only tables and system rows cannot be checked.
//! - Reset when the dataset version changes.
//!
//! Does NOT handle:
//! - Executing bulk actions (see [`crate::bulk`]).
//!
//! Invariants:
//! - `state()` is `Empty` exactly when no key is selected.
//! - Every selected key belonged to the dataset version last synced.

use std::collections::BTreeSet;

use fleetdeck_client::{ResourceKey, ResourceKind};
use tracing::debug;

use crate::auth::SelectionMode;
use crate::view_model::ResourceRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    HasSelection,
}

#[derive(Debug, Clone)]
pub struct Selection {
    kind: ResourceKind,
    mode: SelectionMode,
    dataset_version: Option<u64>,
    selected: BTreeSet<ResourceKey>,
}

impl Selection {
    pub fn new(kind: ResourceKind, mode: SelectionMode) -> Self {
        Self {
            kind,
            mode,
            dataset_version: None,
            selected: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn state(&self) -> SelectionState {
        if self.selected.is_empty() {
            SelectionState::Empty
        } else {
            SelectionState::HasSelection
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.selected.iter()
    }

    pub fn is_selected(&self, key: &ResourceKey) -> bool {
        self.selected.contains(key)
    }

    pub fn is_selectable(&self, row: &ResourceRow) -> bool {
        self.mode == SelectionMode::Selectable && !row.is_system
    }

    /// Record the dataset version being displayed; a different version
    /// clears the selection. Returns true if the selection was reset.
    pub fn sync_dataset(&mut self, version: u64) -> bool {
        let changed = self.dataset_version.is_some_and(|v| v != version);
        self.dataset_version = Some(version);
        if changed && !self.selected.is_empty() {
            debug!(kind = %self.kind, version, "Dataset changed, clearing selection");
            self.selected.clear();
            return true;
        }
        false
    }

    /// Check a row. Returns false if the row cannot be selected.
    pub fn check(&mut self, row: &ResourceRow) -> bool {
        if !self.is_selectable(row) {
            return false;
        }
        self.selected.insert(row.key.clone());
        true
    }

    pub fn uncheck(&mut self, key: &ResourceKey) {
        self.selected.remove(key);
    }

    /// Flip a row's checkbox. Returns whether the row is selected afterwards.
    pub fn toggle(&mut self, row: &ResourceRow) -> bool {
        if self.selected.remove(&row.key) {
            false
        } else {
            self.check(row)
        }
    }

    /// Select every selectable row, or clear if all of them are already selected.
    pub fn toggle_all(&mut self, rows: &[ResourceRow]) {
        let selectable: Vec<&ResourceRow> = rows.iter().filter(|r| self.is_selectable(r)).collect();
        let all_selected = !selectable.is_empty()
            && selectable.iter().all(|r| self.selected.contains(&r.key));
        if all_selected {
            self.selected.clear();
        } else {
            self.selected
                .extend(selectable.into_iter().map(|r| r.key.clone()));
        }
    }

    pub fn remove_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a ResourceKey>) {
        for key in keys {
            self.selected.remove(key);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Selected rows in display order. Keys no longer present are skipped.
    pub fn selected_rows<'a>(&self, rows: &'a [ResourceRow]) -> Vec<&'a ResourceRow> {
        rows.iter()
            .filter(|r| self.selected.contains(&r.key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdeck_client::Resource;

    fn row(ns: &str, name: &str, is_system: bool) -> ResourceRow {
        let resource = Resource::new(name).in_namespace(ns);
        ResourceRow {
            key: resource.key(ResourceKind::KubeSecret),
            resource,
            in_use: false,
            is_system,
        }
    }

    #[test]
    fn test_check_then_uncheck_returns_to_empty() {
        let mut sel = Selection::new(ResourceKind::KubeSecret, SelectionMode::Selectable);
        let r = row("default", "a", false);
        assert_eq!(sel.state(), SelectionState::Empty);
        assert!(sel.check(&r));
        assert_eq!(sel.state(), SelectionState::HasSelection);
        sel.uncheck(&r.key);
        assert_eq!(sel.state(), SelectionState::Empty);
    }

    #[test]
    fn test_dataset_change_resets() {
        let mut sel = Selection::new(ResourceKind::KubeSecret, SelectionMode::Selectable);
        sel.sync_dataset(1);
        sel.check(&row("default", "a", false));
        assert!(!sel.sync_dataset(1));
        assert_eq!(sel.len(), 1);
        assert!(sel.sync_dataset(2));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_system_rows_and_view_only_are_not_selectable() {
        let mut sel = Selection::new(ResourceKind::KubeSecret, SelectionMode::Selectable);
        assert!(!sel.check(&row("kube-system", "t", true)));

        let mut view_only = Selection::new(ResourceKind::KubeSecret, SelectionMode::ViewOnly);
        assert!(!view_only.check(&row("default", "a", false)));
        assert!(view_only.is_empty());
    }

    #[test]
    fn test_toggle_all_skips_unselectable() {
        let rows = vec![
            row("default", "a", false),
            row("kube-system", "b", true),
            row("web", "c", false),
        ];
        let mut sel = Selection::new(ResourceKind::KubeSecret, SelectionMode::Selectable);
        sel.toggle_all(&rows);
        assert_eq!(sel.len(), 2);
        assert_eq!(sel.selected_rows(&rows).len(), 2);
        sel.toggle_all(&rows);
        assert!(sel.is_empty());
    }
}
