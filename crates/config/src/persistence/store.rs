//! Settings store shared by every table view.
//!
//! Responsibilities:
//! - Map each `TableId` to its `TableSettings`, creating defaults on first use.
//! - Merge partial updates and persist them synchronously.
//! - Degrade to memory-only operation when the backend fails.
//!
//! Does NOT handle:
//! - Notifying views about changes (see `fleetdeck_table::TableState`).
//!
//! Invariants:
//! - `get` and `set` never fail from the caller's point of view.
//! - After `set(id, patch)`, `get(id)` returns the merged settings.
//! - Once degraded, the backend is not touched again for the session.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{FileBackend, MemoryBackend, SettingsBackend, SettingsFileError, default_settings_path};
use crate::types::{TableId, TableSettings, TableSettingsPatch};

/// Explicit map from table identity to settings, backed by a persistence backend.
///
/// Construct one per application and hand it to each view; there is no
/// process-global instance.
pub struct SettingsStore {
    backend: Box<dyn SettingsBackend>,
    tables: Mutex<BTreeMap<TableId, TableSettings>>,
    degraded: AtomicBool,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("backend", &self.backend.describe())
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

impl SettingsStore {
    /// Creates a store over an arbitrary backend.
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            tables: Mutex::new(BTreeMap::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Creates a store that keeps settings only for the current session.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Opens the settings file at `path`, or the platform default when `None`.
    ///
    /// If the file cannot be opened the store starts degraded and in memory;
    /// the failure is logged, never returned.
    pub fn open(path: Option<PathBuf>) -> Self {
        let path = match path.map(Ok).unwrap_or_else(default_settings_path) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "No settings directory available, keeping settings in memory");
                return Self::degraded_in_memory();
            }
        };

        match FileBackend::open(&path) {
            Ok(backend) => Self::new(backend),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Settings file unavailable, keeping settings in memory"
                );
                Self::degraded_in_memory()
            }
        }
    }

    fn degraded_in_memory() -> Self {
        let store = Self::in_memory();
        store.degraded.store(true, Ordering::Relaxed);
        store
    }

    /// Returns true once the backend has failed and the store runs from memory.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// Returns the settings for `id`, or defaults if the table was never seen.
    pub fn get(&self, id: &TableId) -> TableSettings {
        let mut tables = self.lock();
        self.load(&mut tables, id)
    }

    /// Merges `patch` into the settings for `id`, persists them, and returns the result.
    ///
    /// Read, merge, insert and write happen under one lock, so concurrent
    /// patches to the same table all land and the backend sees them in order.
    pub fn set(&self, id: &TableId, patch: &TableSettingsPatch) -> TableSettings {
        let mut tables = self.lock();
        let merged = self.load(&mut tables, id).merged(patch);
        tables.insert(id.clone(), merged.clone());

        if !self.is_degraded()
            && let Err(e) = self.backend.write(id, &merged)
        {
            self.degrade(id, &e);
        }

        tracing::debug!(table_id = %id, ?merged, "Table settings updated");
        merged
    }

    fn load(&self, tables: &mut BTreeMap<TableId, TableSettings>, id: &TableId) -> TableSettings {
        if let Some(settings) = tables.get(id) {
            return settings.clone();
        }

        let settings = if self.is_degraded() {
            TableSettings::default()
        } else {
            match self.backend.read(id) {
                Ok(Some(settings)) => settings.sanitize(),
                Ok(None) => TableSettings::default(),
                Err(e) => {
                    self.degrade(id, &e);
                    TableSettings::default()
                }
            }
        };

        tables.insert(id.clone(), settings.clone());
        settings
    }

    fn degrade(&self, id: &TableId, error: &SettingsFileError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                table_id = %id,
                backend = %self.backend.describe(),
                error = %error,
                "Settings backend failed, keeping settings in memory for this session"
            );
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<TableId, TableSettings>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}
