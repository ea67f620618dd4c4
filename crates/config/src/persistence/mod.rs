//! Table settings persistence.
//!
//! Responsibilities:
//! - Define the key-value persistence seam (`SettingsBackend`) keyed by `TableId`.
//! - Provide a JSON file backend and an in-memory backend.
//! - Provide the `SettingsStore` that views read from and write through.
//! - Back up corrupt settings files before they are overwritten.
//!
//! Does NOT handle:
//! - Loading environment variables (see `loader`).
//! - Deciding when settings change (callers patch them on user interaction).
//!
//! Invariants:
//! - Tables with different `TableId` values never observe each other's writes.
//! - A backend failure never reaches the caller of `SettingsStore`; the store
//!   degrades to memory for the rest of the session instead.
//! - File writes are atomic (temp file + rename).

use std::path::{Path, PathBuf};

mod file;
mod memory;
mod path;
mod store;

pub use file::{FileBackend, SettingsDocument, SettingsFileError};
pub use memory::MemoryBackend;
pub use path::default_settings_path;
pub use store::SettingsStore;

use crate::types::{TableId, TableSettings};

/// Synchronous key-value storage for table settings.
///
/// Implementations must be safe to share between views; each call is
/// expected to complete without suspending the caller.
pub trait SettingsBackend: Send + Sync {
    /// Reads the stored settings for `id`, or `None` if the table was never saved.
    fn read(&self, id: &TableId) -> Result<Option<TableSettings>, SettingsFileError>;

    /// Stores `settings` under `id`, replacing any previous value.
    fn write(&self, id: &TableId, settings: &TableSettings) -> Result<(), SettingsFileError>;

    /// Human-readable location used in log messages.
    fn describe(&self) -> String;
}

/// Creates a backup of a corrupt settings file before it is overwritten.
///
/// The file is renamed to `<name>.corrupt.<unix-ts>` so its contents stay
/// available for recovery while no longer blocking startup.
pub(crate) fn create_corrupt_backup(path: &Path) -> Result<PathBuf, std::io::Error> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let backup_path = path.with_extension(format!("corrupt.{}", timestamp));

    std::fs::rename(path, &backup_path)?;

    Ok(backup_path)
}
