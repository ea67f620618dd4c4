//! Configuration context for command execution.
//!
//! Responsibilities:
//! - Distinguish between a connection config and offline commands at compile time.
//! - Provide type-safe extraction of config for commands that need it.
//!
//! Does NOT handle:
//! - Configuration loading (done in `main()`).
//! - CLI argument definitions (see `args` module).
//!
//! Invariants:
//! - Offline commands (settings, validate-deploy) never open an API connection.

use fleetdeck_config::Config;

pub(crate) enum ConfigCommandContext {
    /// A validated config loaded from environment and CLI args.
    Real(Box<Config>),
    /// Commands that only touch local files.
    Offline,
}

impl ConfigCommandContext {
    /// Extract the real config, failing for offline contexts.
    pub(crate) fn into_real_config(self) -> anyhow::Result<Config> {
        match self {
            ConfigCommandContext::Real(config) => Ok(*config),
            ConfigCommandContext::Offline => {
                anyhow::bail!(
                    "Internal error: attempted to use an offline context for an operation requiring connection details"
                )
            }
        }
    }
}
