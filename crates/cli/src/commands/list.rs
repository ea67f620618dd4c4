//! `fleetdeck list`: print the rows of one resource table.

use anyhow::Result;
use fleetdeck_client::{ListFilter, ResourceKind};
use fleetdeck_config::Config;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cancellation::or_cancelled;
use crate::commands::{connect, mount_loaded, table_context};
use crate::formatters::{OutputFormat, get_formatter};

pub struct ListOptions {
    pub namespaces: Vec<String>,
    pub page: Option<usize>,
    pub show_system: bool,
}

pub async fn run(
    config: Config,
    kind: ResourceKind,
    options: ListOptions,
    output_format: OutputFormat,
    cancel: &CancellationToken,
) -> Result<()> {
    info!(kind = %kind, "Listing resources");

    let ctx = table_context(&config);
    let api = connect(&config)?;
    let filter = ListFilter {
        namespaces: options.namespaces,
    };

    let mut table = or_cancelled(cancel, mount_loaded(api, kind, filter, &ctx)).await??;
    if options.show_system {
        table.settings().set_show_system_resources(true);
    }

    let rows = match options.page {
        Some(n) => table.page(n),
        None => table
            .rows()
            .map(|rows| rows.as_ref().clone())
            .unwrap_or_default(),
    };
    table.unmount().await;

    let formatter = get_formatter(output_format);
    println!("{}", formatter.format_rows(kind, &rows)?);
    Ok(())
}
