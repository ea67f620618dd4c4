//! `fleetdeck watch`: keep a table mounted and re-print it when its rows change.
//!
//! The table polls at its persisted auto-refresh rate. Passing `--interval`
//! changes that setting for every later mount too, the same as picking a
//! rate in the table's settings menu.

use anyhow::Result;
use fleetdeck_client::{ListFilter, ResourceKind};
use fleetdeck_config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cancellation::{Cancelled, or_cancelled};
use crate::commands::{connect, mount_loaded, table_context};
use crate::formatters::{OutputFormat, get_formatter};

pub async fn run(
    config: Config,
    kind: ResourceKind,
    interval: Option<u64>,
    count: Option<usize>,
    output_format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    let ctx = table_context(&config);
    let api = connect(&config)?;
    let mut table = or_cancelled(cancel, mount_loaded(api, kind, ListFilter::all(), &ctx)).await??;

    if let Some(secs) = interval {
        table.settings().set_auto_refresh_rate(secs);
    }
    if table.settings().settings().auto_refresh_rate == 0 {
        warn!(kind = %kind, "Auto-refresh is off; showing the current rows only");
    }
    info!(
        kind = %kind,
        rate = table.settings().settings().auto_refresh_rate,
        "Watching table"
    );

    let formatter = get_formatter(output_format);
    let mut datasets = table.subscribe();
    let mut last_version = None;
    let mut renders = 0usize;

    table.start_polling();
    let outcome = loop {
        let snapshot = datasets.borrow_and_update().clone();
        if let Some(err) = &snapshot.error {
            warn!(kind = %kind, error = %err, "Refresh failed; keeping last rows");
        }
        if snapshot.version() != last_version {
            last_version = snapshot.version();
            let rows = table.rows().unwrap_or_default();
            println!("{}", formatter.format_rows(kind, &rows)?);
            renders += 1;
        }

        if count.is_some_and(|max| renders >= max) {
            break Ok(());
        }
        // Without a rate nothing will ever change.
        if table.settings().settings().auto_refresh_rate == 0 {
            break Ok(());
        }

        tokio::select! {
            changed = datasets.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
            _ = cancel.cancelled() => break Err(Cancelled.into()),
        }
    };

    table.unmount().await;
    outcome
}
