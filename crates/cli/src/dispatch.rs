//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to appropriate command handlers.
//! - Extract the connection config for the commands that need it.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Configuration loading (see `main()` and `config_context`).
//!
//! Invariants:
//! - All async commands receive the shared cancellation token.

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::config_context::ConfigCommandContext;

pub(crate) async fn run_command(
    cli: Cli,
    config: ConfigCommandContext,
    cancel_token: &CancellationToken,
) -> Result<()> {
    match cli.command {
        Commands::List {
            kind,
            namespaces,
            page,
            show_system,
        } => {
            let config = config.into_real_config()?;
            let options = commands::list::ListOptions {
                namespaces,
                page,
                show_system,
            };
            commands::list::run(config, kind, options, cli.output, cancel_token).await?;
        }
        Commands::Watch {
            kind,
            interval,
            count,
        } => {
            let config = config.into_real_config()?;
            commands::watch::run(config, kind, interval, count, cli.output, cancel_token).await?;
        }
        Commands::Delete {
            kind,
            keys,
            yes,
            partition,
        } => {
            let config = config.into_real_config()?;
            commands::delete::run(
                config,
                kind,
                keys,
                yes,
                partition,
                cli.output,
                cancel_token,
            )
            .await?;
        }
        Commands::Settings { command } => {
            let settings_path = cli.settings_path.filter(|p| !p.as_os_str().is_empty());
            commands::settings::run(command, settings_path, cli.output)?;
        }
        Commands::ValidateDeploy { values, context } => {
            commands::validate_deploy::run(values, context, cli.output)?;
        }
    }
    Ok(())
}
