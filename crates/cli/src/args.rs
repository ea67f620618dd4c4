//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not handle config loading (see `main` and `config_context`).

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fleetdeck_client::{ResourceKey, ResourceKind};
use fleetdeck_table::PartitionPolicy;

use crate::commands::settings::SettingsCommand;
use crate::formatters::OutputFormat;

#[derive(Parser)]
#[command(name = "fleetdeck")]
#[command(about = "fleetdeck - Manage secrets, configs, ingresses and environments from the command line", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  fleetdeck list k8s-secrets\n  fleetdeck watch docker-configs --interval 10\n  fleetdeck delete k8s-ingresses web/public shop/storefront --yes\n  fleetdeck settings set k8s-secrets --page-size 50 --sort name --desc\n  fleetdeck validate-deploy values.json --context context.json\n"
)]
pub struct Cli {
    /// Base URL of the management API (e.g., https://deck.example.com:9443)
    #[arg(short, long, global = true, env = "FLEETDECK_BASE_URL")]
    pub base_url: Option<String>,

    /// API key sent with every request
    #[arg(short, long, global = true, env = "FLEETDECK_API_TOKEN")]
    pub api_token: Option<String>,

    /// Environment the resource tables are scoped to
    #[arg(short, long, global = true, env = "FLEETDECK_ENVIRONMENT_ID")]
    pub environment: Option<u64>,

    /// Connection timeout in seconds
    #[arg(long, global = true, env = "FLEETDECK_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of retries for rate-limited requests
    #[arg(long, global = true, env = "FLEETDECK_MAX_RETRIES")]
    pub max_retries: Option<usize>,

    /// Skip TLS certificate verification (for self-signed certificates)
    #[arg(long, global = true, env = "FLEETDECK_SKIP_VERIFY")]
    pub skip_verify: bool,

    /// Path of the persisted table settings file (overrides default location)
    #[arg(long, global = true, env = "FLEETDECK_SETTINGS_PATH", value_name = "FILE")]
    pub settings_path: Option<PathBuf>,

    /// Authorizations granted to this session, comma separated.
    ///
    /// When omitted every action is allowed.
    #[arg(
        long,
        global = true,
        env = "FLEETDECK_SCOPES",
        value_delimiter = ',',
        value_name = "SCOPE,..."
    )]
    pub scopes: Option<Vec<String>>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the rows of a resource table
    List {
        /// Resource table (k8s-secrets, k8s-configmaps, k8s-ingresses,
        /// docker-secrets, docker-configs, environments)
        kind: ResourceKind,

        /// Only rows in these namespaces (comma separated)
        #[arg(short, long, value_delimiter = ',')]
        namespaces: Vec<String>,

        /// Page to print (0-based); every row when omitted
        #[arg(long)]
        page: Option<usize>,

        /// Show rows in system namespaces (saved as the table's setting)
        #[arg(long)]
        show_system: bool,
    },

    /// Re-list a resource table every time its data changes
    Watch {
        /// Resource table to watch
        kind: ResourceKind,

        /// Auto-refresh rate in seconds, saved as the table's setting
        #[arg(short, long)]
        interval: Option<u64>,

        /// Stop after this many renders
        #[arg(long)]
        count: Option<usize>,
    },

    /// Delete rows of a resource table in one confirmed bulk action
    Delete {
        /// Resource table the rows belong to
        kind: ResourceKind,

        /// Rows to delete, as `namespace/name`, `name` or id
        #[arg(required = true)]
        keys: Vec<ResourceKey>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// How the selection is split into delete calls
        /// (single, per-namespace, per-key); defaults per table.
        /// Docker secrets and configs are always deleted per key
        #[arg(long)]
        partition: Option<PartitionPolicy>,
    },

    /// Show or change persisted table settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Validate deploy-from-template form values
    ValidateDeploy {
        /// JSON file with the form values
        values: PathBuf,

        /// JSON file with existing stack names, edge groups and template variables
        #[arg(short, long)]
        context: Option<PathBuf>,
    },
}

impl Commands {
    /// Commands that talk to the management API need a full connection config.
    pub fn needs_connection(&self) -> bool {
        matches!(
            self,
            Commands::List { .. } | Commands::Watch { .. } | Commands::Delete { .. }
        )
    }
}
