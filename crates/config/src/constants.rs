//! Centralized constants for the fleetdeck workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed connection timeout in seconds (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Default maximum number of retries for rate-limited requests.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Upper bound for the configurable retry count.
pub const MAX_MAX_RETRIES: usize = 10;

/// Default maximum number of HTTP redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

// =============================================================================
// Table Settings Defaults
// =============================================================================

/// Default number of rows shown per table page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a table accepts.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Column every table sorts by until the user picks another one.
pub const DEFAULT_SORT_COLUMN: &str = "name";

/// Auto-refresh is off until the user enables it.
pub const DEFAULT_AUTO_REFRESH_SECS: u64 = 0;

/// Longest accepted auto-refresh interval in seconds (1 hour).
pub const MAX_AUTO_REFRESH_SECS: u64 = 3600;

// =============================================================================
// Persistence
// =============================================================================

/// File name of the table settings document inside the config directory.
pub const SETTINGS_FILE_NAME: &str = "table-settings.json";

/// Application name used to resolve platform directories.
pub const APP_NAME: &str = "fleetdeck";
