//! Configuration management for fleetdeck.
//!
//! This crate provides the typed per-table settings, the persisted settings
//! store every table view reads from, and the loader for connection
//! configuration from environment variables.

pub mod constants;
mod loader;
pub mod persistence;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, env_var_or_none};
pub use persistence::{
    FileBackend, MemoryBackend, SettingsBackend, SettingsDocument, SettingsFileError,
    SettingsStore,
};
pub use types::{
    Config, ConnectionConfig, InvalidTableId, SortDirection, SortState, TableId, TableSettings,
    TableSettingsPatch,
};
