//! JSON file backend for table settings.
//!
//! Responsibilities:
//! - Read the settings document once at open, backing up corrupt files.
//! - Serve reads from the in-memory copy of the document.
//! - Write the full document atomically on every change.
//!
//! Does NOT handle:
//! - Fallback behaviour when writes fail (see `store.rs`).
//!
//! Invariants:
//! - The on-disk document is never left partially written.
//! - Only the entry for the written `TableId` changes between two saves.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{SettingsBackend, create_corrupt_backup};
use crate::types::{TableId, TableSettings};

/// On-disk representation of all persisted tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default)]
    pub tables: BTreeMap<TableId, TableSettings>,
}

/// Errors that can occur when reading or writing the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsFileError {
    #[error("Failed to read settings file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write settings file at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Settings backend unavailable: {0}")]
    Unavailable(String),
}

/// Settings backend storing every table in one JSON document.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    document: Mutex<SettingsDocument>,
}

impl FileBackend {
    /// Opens the settings file at `path`.
    ///
    /// A missing file yields an empty document. A corrupt file is renamed to
    /// `*.corrupt.<ts>` and replaced by an empty document. Only an unreadable
    /// existing file (e.g. permission denied) is reported as an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsFileError> {
        let path = path.into();
        let document = match read_document(&path) {
            Ok(document) => document,
            Err(SettingsFileError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path.display(), "Settings file not found, starting empty");
                SettingsDocument::default()
            }
            Err(e @ SettingsFileError::Parse { .. }) => {
                match create_corrupt_backup(&path) {
                    Ok(backup_path) => tracing::warn!(
                        path = %path.display(),
                        backup_path = %backup_path.display(),
                        error = %e,
                        "Settings file is corrupt, backed up and using defaults"
                    ),
                    Err(backup_err) => tracing::error!(
                        path = %path.display(),
                        error = %e,
                        backup_error = %backup_err,
                        "Settings file is corrupt and backup failed, using defaults"
                    ),
                }
                SettingsDocument::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a copy of the whole document.
    pub fn snapshot(&self) -> SettingsDocument {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SettingsDocument> {
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Writes to a temporary file first, then renames it over the target.
    fn atomic_save(&self, document: &SettingsDocument) -> Result<(), SettingsFileError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsFileError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let temp_path = self.path.with_extension("tmp");
        let content = serde_json::to_string_pretty(document)?;
        std::fs::write(&temp_path, content).map_err(|source| SettingsFileError::Write {
            path: temp_path.clone(),
            source,
        })?;

        std::fs::rename(&temp_path, &self.path).map_err(|source| SettingsFileError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), "Settings saved atomically");
        Ok(())
    }
}

impl SettingsBackend for FileBackend {
    fn read(&self, id: &TableId) -> Result<Option<TableSettings>, SettingsFileError> {
        Ok(self.lock().tables.get(id).cloned())
    }

    fn write(&self, id: &TableId, settings: &TableSettings) -> Result<(), SettingsFileError> {
        let mut document = self.lock();
        let previous = document.tables.insert(id.clone(), settings.clone());
        if let Err(e) = self.atomic_save(&document) {
            // Keep the in-memory copy consistent with what is on disk.
            match previous {
                Some(previous) => document.tables.insert(id.clone(), previous),
                None => document.tables.remove(id),
            };
            return Err(e);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn read_document(path: &Path) -> Result<SettingsDocument, SettingsFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| SettingsFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
