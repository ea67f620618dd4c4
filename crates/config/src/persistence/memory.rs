//! In-memory settings backend.
//!
//! Used when no settings file is configured and by tests. Contents live for
//! the lifetime of the backend only.

use std::collections::BTreeMap;
use std::sync::Mutex;

use super::{SettingsBackend, SettingsFileError};
use crate::types::{TableId, TableSettings};

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: Mutex<BTreeMap<TableId, TableSettings>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self, id: &TableId) -> Result<Option<TableSettings>, SettingsFileError> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        Ok(tables.get(id).cloned())
    }

    fn write(&self, id: &TableId, settings: &TableSettings) -> Result<(), SettingsFileError> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.insert(id.clone(), settings.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
