//! Configuration types for fleetdeck.
//!
//! Responsibilities:
//! - Define the per-table settings record (`TableSettings`) and its partial update (`TableSettingsPatch`).
//! - Define the table identity key (`TableId`).
//! - Define connection configuration for the management API.
//!
//! Does NOT handle:
//! - Reading or writing settings to disk (see `persistence`).
//! - Loading values from the environment (see `loader`).
//!
//! Invariants:
//! - A `TableId` is never empty and never contains whitespace.
//! - `TableSettings` values are always within their documented bounds after `sanitize()`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTO_REFRESH_SECS, DEFAULT_PAGE_SIZE, DEFAULT_SORT_COLUMN, MAX_AUTO_REFRESH_SECS,
    MAX_PAGE_SIZE,
};

/// Stable key identifying one table's persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableId(String);

/// Error returned when a string is not a valid table identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid table id '{0}': must be non-empty and contain no whitespace")]
pub struct InvalidTableId(pub String);

impl TableId {
    /// Creates a table identity, rejecting empty or whitespace-containing keys.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidTableId> {
        let id = id.into();
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(InvalidTableId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TableId {
    type Err = InvalidTableId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TableId {
    type Error = InvalidTableId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableId> for String {
    fn from(id: TableId) -> Self {
        id.0
    }
}

/// Sort direction for a table column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: String,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: DEFAULT_SORT_COLUMN.to_string(),
            direction: SortDirection::Asc,
        }
    }
}

/// User-adjustable settings of a single table.
///
/// Created with defaults on first use of a [`TableId`], mutated through
/// [`TableSettingsPatch`], and persisted on every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Rows per page.
    pub page_size: u32,
    /// Active sort.
    pub sort: SortState,
    /// Polling interval in seconds; 0 disables auto-refresh.
    pub auto_refresh_rate: u64,
    /// Whether rows in system namespaces are shown (still subject to authorization).
    pub show_system_resources: bool,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortState::default(),
            auto_refresh_rate: DEFAULT_AUTO_REFRESH_SECS,
            show_system_resources: false,
        }
    }
}

impl TableSettings {
    /// Returns the polling interval, or `None` when auto-refresh is disabled.
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.auto_refresh_rate > 0).then(|| Duration::from_secs(self.auto_refresh_rate))
    }

    /// Clamps every field into its accepted range.
    ///
    /// Settings read from disk pass through here so a hand-edited file can
    /// never produce a zero page size or an hour-plus polling interval.
    pub fn sanitize(mut self) -> Self {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            tracing::warn!(
                page_size = self.page_size,
                "Page size out of range, clamping"
            );
            self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        }
        if self.auto_refresh_rate > MAX_AUTO_REFRESH_SECS {
            tracing::warn!(
                auto_refresh_rate = self.auto_refresh_rate,
                "Auto-refresh rate out of range, clamping"
            );
            self.auto_refresh_rate = MAX_AUTO_REFRESH_SECS;
        }
        if self.sort.column.trim().is_empty() {
            self.sort.column = DEFAULT_SORT_COLUMN.to_string();
        }
        self
    }

    /// Applies a partial update and returns the sanitized result.
    pub fn merged(mut self, patch: &TableSettingsPatch) -> Self {
        if let Some(page_size) = patch.page_size {
            self.page_size = page_size;
        }
        if let Some(sort) = &patch.sort {
            self.sort = sort.clone();
        }
        if let Some(rate) = patch.auto_refresh_rate {
            self.auto_refresh_rate = rate;
        }
        if let Some(show) = patch.show_system_resources {
            self.show_system_resources = show;
        }
        self.sanitize()
    }
}

/// Partial update of [`TableSettings`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettingsPatch {
    pub page_size: Option<u32>,
    pub sort: Option<SortState>,
    pub auto_refresh_rate: Option<u64>,
    pub show_system_resources: Option<bool>,
}

impl TableSettingsPatch {
    pub fn page_size(size: u32) -> Self {
        Self {
            page_size: Some(size),
            ..Self::default()
        }
    }

    pub fn sort(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sort: Some(SortState {
                column: column.into(),
                direction,
            }),
            ..Self::default()
        }
    }

    pub fn auto_refresh_rate(secs: u64) -> Self {
        Self {
            auto_refresh_rate: Some(secs),
            ..Self::default()
        }
    }

    pub fn show_system_resources(show: bool) -> Self {
        Self {
            show_system_resources: Some(show),
            ..Self::default()
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Connection configuration for the management API.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the management server (e.g., `https://deck.example.com:9443`).
    pub base_url: String,
    /// API key sent with every request.
    pub api_token: Option<SecretString>,
    /// Environment (endpoint) that environment-scoped resources belong to.
    pub environment_id: u64,
    /// Whether to skip TLS verification (for self-signed certificates).
    pub skip_verify: bool,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries for rate-limited requests.
    pub max_retries: usize,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionConfig,
    /// Location of the persisted table settings document.
    pub settings_path: Option<std::path::PathBuf>,
    /// Authorization scopes granted to the session. `None` means unrestricted.
    pub scopes: Option<Vec<String>>,
}
