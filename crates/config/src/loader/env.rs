//! Environment variable parsing for configuration.
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid numeric values return ConfigError::InvalidValue.

use secrecy::SecretString;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_env<T: FromStr>(key: &str, message: &str) -> Result<Option<T>, ConfigError> {
    env_var_or_none(key)
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: key.to_string(),
                message: message.to_string(),
            })
        })
        .transpose()
}

/// Splits a comma-separated scope list, dropping blanks.
pub(crate) fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply environment variable configuration to the loader.
///
/// Only fields not already set through builder methods are filled in.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(url) = env_var_or_none("FLEETDECK_BASE_URL") {
        loader.set_base_url_if_unset(url);
    }
    if let Some(token) = env_var_or_none("FLEETDECK_API_TOKEN") {
        loader.set_api_token_if_unset(SecretString::new(token.into()));
    }
    if let Some(env_id) = parse_env::<u64>("FLEETDECK_ENVIRONMENT_ID", "must be a positive integer")? {
        loader.set_environment_id_if_unset(env_id);
    }
    if let Some(skip) = parse_env::<bool>("FLEETDECK_SKIP_VERIFY", "must be true or false")? {
        loader.set_skip_verify_if_unset(skip);
    }
    if let Some(secs) = parse_env::<u64>("FLEETDECK_TIMEOUT", "must be a number")? {
        loader.set_timeout_if_unset(Duration::from_secs(secs));
    }
    if let Some(retries) =
        parse_env::<usize>("FLEETDECK_MAX_RETRIES", "must be a non-negative integer")?
    {
        loader.set_max_retries_if_unset(retries);
    }
    if let Some(path) = env_var_or_none("FLEETDECK_SETTINGS_PATH") {
        loader.set_settings_path_if_unset(PathBuf::from(path));
    }
    if let Some(scopes) = env_var_or_none("FLEETDECK_SCOPES") {
        loader.set_scopes_if_unset(parse_scopes(&scopes));
    }

    Ok(())
}
