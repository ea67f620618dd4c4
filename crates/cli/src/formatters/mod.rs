//! Output formatters for CLI commands.
//!
//! Responsibilities:
//! - Provide the table and JSON output formats.
//! - Render resource rows, table settings, bulk delete reports and form
//!   validation errors.
//!
//! Does NOT handle:
//! - Direct printing to stdout (returns formatted strings).
//! - Deriving rows (see `fleetdeck_table::ViewModelBuilder`).
//!
//! Invariants:
//! - Tables use tab-separation for consistent alignment in standard terminals.
//! - JSON output for an empty row set is `[]`; table output is `No items found.`.

use anyhow::Result;
use clap::ValueEnum;
use fleetdeck_client::ResourceKind;
use fleetdeck_config::{TableId, TableSettings};
use fleetdeck_table::{BulkReport, ResourceRow, ValidationErrors};

mod json;
mod table;

pub use json::JsonFormatter;
pub use table::TableFormatter;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Renders command results in one output format.
pub trait Formatter {
    fn format_rows(&self, kind: ResourceKind, rows: &[ResourceRow]) -> Result<String>;

    fn format_table_settings(&self, id: &TableId, settings: &TableSettings) -> Result<String>;

    fn format_bulk_report(&self, kind: ResourceKind, report: &BulkReport) -> Result<String>;

    fn format_validation(&self, errors: &ValidationErrors) -> Result<String>;
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdeck_client::{Resource, ResourceKey};
    use fleetdeck_table::DeployContext;
    use fleetdeck_table::deploy_form::DeployFormValues;

    fn row(ns: &str, name: &str, in_use: bool) -> ResourceRow {
        ResourceRow {
            resource: Resource::new(name).in_namespace(ns),
            key: ResourceKey::namespaced(ns, name),
            in_use,
            is_system: false,
        }
    }

    #[test]
    fn test_table_rows_have_header_and_usage_column() {
        let out = TableFormatter
            .format_rows(
                ResourceKind::KubeSecret,
                &[row("default", "db", true), row("web", "tls", false)],
            )
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "NAME\tNAMESPACE\tCREATED\tIN USE");
        assert_eq!(lines[1], "db\tdefault\tN/A\tyes");
        assert_eq!(lines[2], "tls\tweb\tN/A\tno");
    }

    #[test]
    fn test_table_rows_skip_namespace_for_docker() {
        let rows = vec![ResourceRow {
            resource: Resource::new("nginx.conf").with_id("abc"),
            key: ResourceKey::global("nginx.conf"),
            in_use: false,
            is_system: false,
        }];
        let out = TableFormatter
            .format_rows(ResourceKind::DockerConfig, &rows)
            .unwrap();
        assert!(out.starts_with("NAME\tID\tCREATED\n"));
        assert!(out.contains("nginx.conf\tabc\tN/A"));
    }

    #[test]
    fn test_empty_rows() {
        assert_eq!(
            TableFormatter
                .format_rows(ResourceKind::KubeSecret, &[])
                .unwrap(),
            "No items found."
        );
        assert_eq!(
            JsonFormatter
                .format_rows(ResourceKind::KubeSecret, &[])
                .unwrap(),
            "[]"
        );
    }

    #[test]
    fn test_json_rows_flatten_resource() {
        let out = JsonFormatter
            .format_rows(ResourceKind::KubeSecret, &[row("default", "db", true)])
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["name"], "db");
        assert_eq!(value[0]["namespace"], "default");
        assert_eq!(value[0]["key"], "default/db");
        assert_eq!(value[0]["inUse"], true);
    }

    #[test]
    fn test_settings_output() {
        let id = TableId::new("k8sSecretsDatatable").unwrap();
        let out = TableFormatter
            .format_table_settings(&id, &TableSettings::default())
            .unwrap();
        assert!(out.contains("Table: k8sSecretsDatatable"));
        assert!(out.contains("Page size: 10"));
        assert!(out.contains("Auto-refresh: off"));

        let json = JsonFormatter
            .format_table_settings(&id, &TableSettings::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["table"], "k8sSecretsDatatable");
        assert_eq!(value["settings"]["page_size"], 10);
    }

    #[test]
    fn test_validation_output() {
        let errors = DeployFormValues::default()
            .validate(&DeployContext::default())
            .unwrap_err();
        let out = TableFormatter.format_validation(&errors).unwrap();
        assert!(out.contains("name\tName is required"));

        let json = JsonFormatter.format_validation(&errors).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"][0], "Name is required");
    }
}
