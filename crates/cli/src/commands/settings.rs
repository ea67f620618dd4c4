//! `fleetdeck settings`: inspect and change persisted table settings offline.
//!
//! Responsibilities:
//! - Resolve a table by resource kind (`k8s-secrets`) or raw table id.
//! - Apply partial updates through the settings store, which clamps values
//!   into range and persists them.
//!
//! Does NOT handle:
//! - Live tables; a mounted table picks changes up on its next mount.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use fleetdeck_client::ResourceKind;
use fleetdeck_config::{SettingsStore, SortDirection, SortState, TableId, TableSettingsPatch};
use fleetdeck_table::table_id;
use tracing::{info, warn};

use crate::formatters::{OutputFormat, get_formatter};

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print one table's settings
    Show {
        /// Resource kind or table id
        table: String,
    },
    /// Change one table's settings
    Set {
        /// Resource kind or table id
        table: String,

        /// Rows per page
        #[arg(long)]
        page_size: Option<u32>,

        /// Auto-refresh rate in seconds (0 turns it off)
        #[arg(long)]
        auto_refresh: Option<u64>,

        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending (only with --sort)
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Show rows in system namespaces
        #[arg(long)]
        show_system: Option<bool>,
    },
}

/// Kind names map to their table's key; anything else is taken as a table id.
pub fn resolve_table(table: &str) -> Result<TableId> {
    let id = match table.parse::<ResourceKind>() {
        Ok(kind) => table_id(kind)?,
        Err(_) => TableId::new(table).with_context(|| format!("Invalid table '{table}'"))?,
    };
    Ok(id)
}

pub fn run(
    cmd: SettingsCommand,
    settings_path: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let store = SettingsStore::open(settings_path);
    if store.is_degraded() {
        warn!("Settings file unavailable; changes will not be saved");
    }
    let formatter = get_formatter(output_format);

    match cmd {
        SettingsCommand::Show { table } => {
            let id = resolve_table(&table)?;
            let settings = store.get(&id);
            println!("{}", formatter.format_table_settings(&id, &settings)?);
        }
        SettingsCommand::Set {
            table,
            page_size,
            auto_refresh,
            sort,
            desc,
            show_system,
        } => {
            let id = resolve_table(&table)?;
            let patch = TableSettingsPatch {
                page_size,
                sort: sort.map(|column| SortState {
                    column,
                    direction: if desc {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    },
                }),
                auto_refresh_rate: auto_refresh,
                show_system_resources: show_system,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to change: pass at least one setting");
            }
            let settings = store.set(&id, &patch);
            info!(table_id = %id, "Updated table settings");
            println!("{}", formatter.format_table_settings(&id, &settings)?);
        }
    }
    Ok(())
}
