//! `fleetdeck delete`: select rows by key and run one confirmed bulk delete.
//!
//! Responsibilities:
//! - Resolve keys given on the command line against the table's rows.
//! - Confirm (unless `--yes`), delete, and report per-partition outcomes.
//!
//! Does NOT handle:
//! - Partitioning or notification text (see `fleetdeck_table::bulk`).
//!
//! Invariants:
//! - Nothing is sent when a key is unknown or the prompt is declined.
//! - A partial failure exits non-zero and names the keys still present.

use anyhow::Result;
use fleetdeck_client::{ListFilter, ResourceKey, ResourceKind};
use fleetdeck_config::Config;
use fleetdeck_table::{PartitionPolicy, ResourceRow, SelectionMode};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cancellation::or_cancelled;
use crate::commands::{connect, mount_loaded, table_context};
use crate::error::{PartialDeleteFailure, UnknownKeys};
use crate::formatters::{OutputFormat, get_formatter};
use crate::interactive;

pub async fn run(
    config: Config,
    kind: ResourceKind,
    keys: Vec<ResourceKey>,
    yes: bool,
    partition: Option<PartitionPolicy>,
    output_format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let ctx = table_context(&config);
    let api = connect(&config)?;
    let mut table = or_cancelled(cancel, mount_loaded(api, kind, ListFilter::all(), &ctx)).await??;
    if let Some(policy) = partition {
        table = table.with_partition_policy(policy);
    }

    let rows = table.rows().unwrap_or_default();
    let mut unknown = Vec::new();
    for key in keys {
        match rows.iter().find(|r| matches_key(r, &key)) {
            Some(row) => {
                if !table.selection_mut().check(row)
                    && table.selection().mode() != SelectionMode::ViewOnly
                {
                    warn!(key = %key, "Row cannot be selected; skipping");
                }
            }
            None => unknown.push(key),
        }
    }
    if !unknown.is_empty() {
        table.unmount().await;
        return Err(UnknownKeys {
            plural: kind.plural(),
            keys: unknown,
        }
        .into());
    }

    let pending = match table.request_delete() {
        Ok(pending) => pending,
        Err(e) => {
            table.unmount().await;
            return Err(e.into());
        }
    };

    if !yes && !interactive::confirm_delete(&pending)? {
        table.unmount().await;
        return Ok(());
    }

    let total = pending.len();
    info!(kind = %kind, count = total, policy = %table.partition_policy(), "Deleting rows");
    let report = table.confirm_delete(pending).await;
    table.unmount().await;

    let formatter = get_formatter(output_format);
    println!("{}", formatter.format_bulk_report(kind, &report)?);

    if report.is_success() {
        return Ok(());
    }
    let failed: Vec<ResourceKey> = report.failed_keys().cloned().collect();
    Err(PartialDeleteFailure {
        failed: failed.len(),
        total,
        keys: failed,
    }
    .into())
}

/// Rows match on their key; rows without a namespace also match on their id.
fn matches_key(row: &ResourceRow, key: &ResourceKey) -> bool {
    row.key == *key || (key.namespace.is_none() && row.resource.id == key.name)
}
