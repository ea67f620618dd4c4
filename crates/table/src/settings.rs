//! Per-view binding of the persisted settings store.
//!
//! Responsibilities:
//! - Read a table's settings once at mount and keep them in memory.
//! - Apply user changes through the store (persisted on every mutation).
//! - Publish changes, including a separate refresh-interval channel that only
//!   fires when the interval actually changes.
//!
//! Does NOT handle:
//! - Storage, merging, or clamping (see `fleetdeck_config::SettingsStore`).

use std::sync::Arc;
use std::time::Duration;

use fleetdeck_config::{SettingsStore, SortDirection, TableId, TableSettings, TableSettingsPatch};
use tokio::sync::watch;
use tracing::debug;

/// Live settings of one mounted table.
#[derive(Debug)]
pub struct TableState {
    store: Arc<SettingsStore>,
    id: TableId,
    settings: watch::Sender<TableSettings>,
    interval: watch::Sender<Option<Duration>>,
}

impl TableState {
    pub fn new(store: Arc<SettingsStore>, id: TableId) -> Self {
        let current = store.get(&id);
        let (interval, _) = watch::channel(current.refresh_interval());
        let (settings, _) = watch::channel(current);
        Self {
            store,
            id,
            settings,
            interval,
        }
    }

    pub fn id(&self) -> &TableId {
        &self.id
    }

    pub fn settings(&self) -> TableSettings {
        self.settings.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TableSettings> {
        self.settings.subscribe()
    }

    /// Receiver for the polling interval; `None` means polling is off.
    pub fn refresh_interval(&self) -> watch::Receiver<Option<Duration>> {
        self.interval.subscribe()
    }

    /// Merge `patch`, persist, and publish the result.
    pub fn update(&self, patch: &TableSettingsPatch) -> TableSettings {
        if patch.is_empty() {
            return self.settings();
        }
        let next = self.store.set(&self.id, patch);
        debug!(table_id = %self.id, ?patch, "Table settings updated");

        let interval = next.refresh_interval();
        self.interval.send_if_modified(|current| {
            if *current == interval {
                false
            } else {
                *current = interval;
                true
            }
        });
        self.settings.send_replace(next.clone());
        next
    }

    pub fn set_page_size(&self, size: u32) -> TableSettings {
        self.update(&TableSettingsPatch::page_size(size))
    }

    pub fn set_auto_refresh_rate(&self, secs: u64) -> TableSettings {
        self.update(&TableSettingsPatch::auto_refresh_rate(secs))
    }

    pub fn set_show_system_resources(&self, show: bool) -> TableSettings {
        self.update(&TableSettingsPatch::show_system_resources(show))
    }

    pub fn set_sort(&self, column: &str, direction: SortDirection) -> TableSettings {
        self.update(&TableSettingsPatch::sort(column, direction))
    }

    /// Column header click: same column flips direction, new column sorts ascending.
    pub fn toggle_sort(&self, column: &str) -> TableSettings {
        let current = self.settings().sort;
        let direction = if current.column == column {
            current.direction.toggle()
        } else {
            SortDirection::Asc
        };
        self.set_sort(column, direction)
    }
}
