//! JSON formatter implementation.
//!
//! Responsibilities:
//! - Format rows, settings and reports as pretty-printed JSON.
//!
//! Does NOT handle:
//! - Other output formats.

use std::collections::BTreeMap;

use anyhow::Result;
use fleetdeck_client::{Resource, ResourceKey, ResourceKind};
use fleetdeck_config::{TableId, TableSettings};
use fleetdeck_table::{BulkReport, ResourceRow, ValidationErrors};
use serde::Serialize;

use crate::formatters::Formatter;

/// JSON formatter.
pub struct JsonFormatter;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RowOutput<'a> {
    key: String,
    #[serde(flatten)]
    resource: &'a Resource,
    in_use: bool,
    is_system: bool,
}

#[derive(Serialize)]
struct SettingsOutput<'a> {
    table: &'a str,
    settings: &'a TableSettings,
}

#[derive(Serialize)]
struct FailureOutput<'a> {
    keys: Vec<String>,
    message: &'a str,
}

#[derive(Serialize)]
struct ReportOutput<'a> {
    kind: ResourceKind,
    removed: &'a [ResourceKey],
    failures: Vec<FailureOutput<'a>>,
    refreshed: bool,
}

impl Formatter for JsonFormatter {
    fn format_rows(&self, _kind: ResourceKind, rows: &[ResourceRow]) -> Result<String> {
        let out: Vec<RowOutput<'_>> = rows
            .iter()
            .map(|row| RowOutput {
                key: row.key.to_string(),
                resource: &row.resource,
                in_use: row.in_use,
                is_system: row.is_system,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&out)?)
    }

    fn format_table_settings(&self, id: &TableId, settings: &TableSettings) -> Result<String> {
        Ok(serde_json::to_string_pretty(&SettingsOutput {
            table: id.as_str(),
            settings,
        })?)
    }

    fn format_bulk_report(&self, kind: ResourceKind, report: &BulkReport) -> Result<String> {
        let failures = report
            .failures
            .iter()
            .map(|f| FailureOutput {
                keys: f.keys.iter().map(ToString::to_string).collect(),
                message: &f.message,
            })
            .collect();
        Ok(serde_json::to_string_pretty(&ReportOutput {
            kind,
            removed: &report.removed,
            failures,
            refreshed: report.refreshed,
        })?)
    }

    fn format_validation(&self, errors: &ValidationErrors) -> Result<String> {
        let mut fields: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (field, message) in errors.iter() {
            fields.entry(field).or_default().push(message);
        }
        Ok(serde_json::to_string_pretty(&fields)?)
    }
}
