//! Table formatter implementation.
//!
//! Responsibilities:
//! - Format rows, settings and reports as tab-separated text.
//!
//! Does NOT handle:
//! - Other output formats.
//! - Paging (rows arrive already paged).

use std::fmt::Write as _;

use anyhow::Result;
use fleetdeck_client::ResourceKind;
use fleetdeck_config::{TableId, TableSettings};
use fleetdeck_table::{BulkReport, ResourceRow, ValidationErrors};

use crate::formatters::Formatter;

const MISSING: &str = "N/A";

/// Table formatter.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_rows(&self, kind: ResourceKind, rows: &[ResourceRow]) -> Result<String> {
        if rows.is_empty() {
            return Ok("No items found.".to_string());
        }

        let mut header = vec!["NAME"];
        header.push(if kind.is_namespaced() { "NAMESPACE" } else { "ID" });
        header.push("CREATED");
        if kind.tracks_usage() {
            header.push("IN USE");
        }

        let mut output = header.join("\t");
        output.push('\n');

        for row in rows {
            let r = &row.resource;
            let mut cells = vec![r.name.clone()];
            if kind.is_namespaced() {
                let mut ns = r.namespace.clone().unwrap_or_else(|| MISSING.to_string());
                if row.is_system {
                    ns.push_str(" (system)");
                }
                cells.push(ns);
            } else {
                cells.push(r.id.clone());
            }
            cells.push(
                r.created_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| MISSING.to_string()),
            );
            if kind.tracks_usage() {
                cells.push(if row.in_use { "yes" } else { "no" }.to_string());
            }
            output.push_str(&cells.join("\t"));
            output.push('\n');
        }

        Ok(output)
    }

    fn format_table_settings(&self, id: &TableId, settings: &TableSettings) -> Result<String> {
        let mut output = String::new();
        writeln!(output, "Table: {}", id.as_str())?;
        writeln!(output, "Page size: {}", settings.page_size)?;
        writeln!(
            output,
            "Sort: {} {}",
            settings.sort.column,
            settings.sort.direction.as_str()
        )?;
        match settings.auto_refresh_rate {
            0 => writeln!(output, "Auto-refresh: off")?,
            secs => writeln!(output, "Auto-refresh: {secs}s")?,
        }
        writeln!(
            output,
            "Show system resources: {}",
            settings.show_system_resources
        )?;
        Ok(output)
    }

    fn format_bulk_report(&self, kind: ResourceKind, report: &BulkReport) -> Result<String> {
        let mut output = String::new();
        if !report.removed.is_empty() {
            writeln!(
                output,
                "Removed {}: {}",
                fleetdeck_table::pluralize(report.removed.len(), kind.noun()),
                join(report.removed.iter())
            )?;
        }
        for failure in &report.failures {
            writeln!(output, "Failed: {}", failure.message)?;
        }
        Ok(output)
    }

    fn format_validation(&self, errors: &ValidationErrors) -> Result<String> {
        let mut output = String::from("FIELD\tERROR\n");
        for (field, message) in errors.iter() {
            writeln!(output, "{field}\t{message}")?;
        }
        Ok(output)
    }
}

fn join<T: ToString>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}
