//! Command handlers.
//!
//! Responsibilities:
//! - Build the session-wide table context from the loaded config.
//! - Connect the API client and mount resource tables for the table commands.
//!
//! Does NOT handle:
//! - Argument parsing (see `args`).
//! - Exit code mapping (see `error`).

pub mod delete;
pub mod list;
pub mod settings;
pub mod validate_deploy;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use fleetdeck_client::{FleetClient, ListFilter, ResourceKind};
use fleetdeck_config::{Config, SettingsStore};
use fleetdeck_table::{
    Authorizations, EnvironmentContext, Notification, NotificationSink, ResourceTable,
    TableContext, ToastLevel,
};

/// Prints notifications to stderr so stdout stays machine-readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl NotificationSink for StderrNotifier {
    fn notify(&self, n: Notification) {
        tracing::debug!(id = %n.id, level = n.level.label(), title = %n.title, "{}", n.message);
        match n.level {
            ToastLevel::Info | ToastLevel::Success => eprintln!("{}: {}", n.title, n.message),
            ToastLevel::Warning | ToastLevel::Error => {
                eprintln!("{}: {}: {}", n.level.label(), n.title, n.message)
            }
        }
    }
}

pub(crate) fn table_context(config: &Config) -> TableContext {
    let store = SettingsStore::open(config.settings_path.clone());
    if store.is_degraded() {
        tracing::warn!("Table settings could not be loaded; changes will not be saved");
    }
    TableContext {
        store: Arc::new(store),
        auth: Authorizations::from_config(config.scopes.as_deref()),
        notifier: Arc::new(StderrNotifier),
        environments: Arc::new(EnvironmentContext::new(Some(
            config.connection.environment_id,
        ))),
    }
}

pub(crate) fn connect(config: &Config) -> Result<Arc<FleetClient>> {
    let client = FleetClient::builder()
        .from_config(config)
        .build()
        .context("Failed to build API client")?;
    Ok(Arc::new(client))
}

/// Mount and load a table, failing when the first fetch fails.
pub(crate) async fn mount_loaded(
    api: Arc<FleetClient>,
    kind: ResourceKind,
    filter: ListFilter,
    ctx: &TableContext,
) -> Result<ResourceTable<FleetClient>> {
    let table = ResourceTable::mount(api, kind, filter, ctx)?;
    table.load().await;
    if let Some(err) = table.snapshot().error {
        table.unmount().await;
        return Err(anyhow::Error::new(err).context(format!("Failed to list {}", kind.plural())));
    }
    Ok(table)
}
