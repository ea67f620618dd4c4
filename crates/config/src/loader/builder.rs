//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration.
//! - Validate and normalize values when building the final `Config`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over environment variables.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS, MAX_MAX_RETRIES, MAX_TIMEOUT_SECS};
use crate::types::{Config, ConnectionConfig};

/// Environment used when none is configured.
const DEFAULT_ENVIRONMENT_ID: u64 = 1;

/// Configuration loader that builds config from explicit values and the environment.
#[derive(Default)]
pub struct ConfigLoader {
    base_url: Option<String>,
    api_token: Option<SecretString>,
    environment_id: Option<u64>,
    skip_verify: Option<bool>,
    timeout: Option<Duration>,
    max_retries: Option<usize>,
    settings_path: Option<PathBuf>,
    scopes: Option<Vec<String>>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the .env file is not loaded.
    /// Missing `.env` files are silently ignored.
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(dotenvy::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                Ok(self)
            }
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Fill unset values from `FLEETDECK_*` environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    pub fn with_api_token(mut self, token: String) -> Self {
        self.api_token = Some(SecretString::new(token.into()));
        self
    }

    pub fn with_environment_id(mut self, id: u64) -> Self {
        self.environment_id = Some(id);
        self
    }

    pub fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = Some(skip);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = Some(scopes);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let base_url = self
            .base_url
            .as_deref()
            .map(validate_and_normalize_base_url)
            .transpose()?
            .ok_or(ConfigError::MissingBaseUrl)?;

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        validate_timeout(timeout)?;

        let max_retries = self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries > MAX_MAX_RETRIES {
            return Err(ConfigError::InvalidMaxRetries {
                message: format!(
                    "must be between 0 and {} (got {})",
                    MAX_MAX_RETRIES, max_retries
                ),
            });
        }

        Ok(Config {
            connection: ConnectionConfig {
                base_url,
                api_token: self.api_token,
                environment_id: self.environment_id.unwrap_or(DEFAULT_ENVIRONMENT_ID),
                skip_verify: self.skip_verify.unwrap_or(false),
                timeout,
                max_retries,
            },
            settings_path: self.settings_path,
            scopes: self.scopes,
        })
    }

    pub(crate) fn set_base_url_if_unset(&mut self, url: String) {
        self.base_url.get_or_insert(url);
    }

    pub(crate) fn set_api_token_if_unset(&mut self, token: SecretString) {
        self.api_token.get_or_insert(token);
    }

    pub(crate) fn set_environment_id_if_unset(&mut self, id: u64) {
        self.environment_id.get_or_insert(id);
    }

    pub(crate) fn set_skip_verify_if_unset(&mut self, skip: bool) {
        self.skip_verify.get_or_insert(skip);
    }

    pub(crate) fn set_timeout_if_unset(&mut self, timeout: Duration) {
        self.timeout.get_or_insert(timeout);
    }

    pub(crate) fn set_max_retries_if_unset(&mut self, retries: usize) {
        self.max_retries.get_or_insert(retries);
    }

    pub(crate) fn set_settings_path_if_unset(&mut self, path: PathBuf) {
        self.settings_path.get_or_insert(path);
    }

    pub(crate) fn set_scopes_if_unset(&mut self, scopes: Vec<String>) {
        self.scopes.get_or_insert(scopes);
    }
}

fn validate_timeout(timeout: Duration) -> Result<(), ConfigError> {
    let secs = timeout.as_secs();
    if secs == 0 {
        return Err(ConfigError::InvalidTimeout {
            message: "timeout must be greater than 0 seconds".to_string(),
        });
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidTimeout {
            message: format!(
                "timeout exceeds maximum allowed value of {} seconds",
                MAX_TIMEOUT_SECS
            ),
        });
    }
    Ok(())
}

/// Validates and normalizes a base URL string.
///
/// Validation rules:
/// - Trim surrounding whitespace; blank counts as missing
/// - Parse as an absolute http(s) URL with a host
/// - Normalize by stripping trailing slash
fn validate_and_normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        var: "base_url".into(),
        message: format!("must be an absolute http(s) URL with a host: {e}"),
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidValue {
            var: "base_url".into(),
            message: format!("scheme must be http or https, got: {scheme}"),
        });
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            var: "base_url".into(),
            message: "host is required".into(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    fn clean_env<F: FnOnce()>(vars: &[(&str, Option<&str>)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> = vec![
            ("FLEETDECK_BASE_URL", None),
            ("FLEETDECK_API_TOKEN", None),
            ("FLEETDECK_ENVIRONMENT_ID", None),
            ("FLEETDECK_SKIP_VERIFY", None),
            ("FLEETDECK_TIMEOUT", None),
            ("FLEETDECK_MAX_RETRIES", None),
            ("FLEETDECK_SETTINGS_PATH", None),
            ("FLEETDECK_SCOPES", None),
        ];
        for (key, value) in vars {
            if let Some(slot) = all.iter_mut().find(|(k, _)| k == key) {
                slot.1 = *value;
            }
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    #[serial]
    fn test_build_from_env() {
        clean_env(
            &[
                ("FLEETDECK_BASE_URL", Some("https://deck.example.com:9443/")),
                ("FLEETDECK_API_TOKEN", Some("ptr_abc")),
                ("FLEETDECK_ENVIRONMENT_ID", Some("7")),
                ("FLEETDECK_SCOPES", Some("K8sSecretsW,K8sIngressesW")),
            ],
            || {
                let config = ConfigLoader::new().from_env().unwrap().build().unwrap();
                assert_eq!(config.connection.base_url, "https://deck.example.com:9443");
                assert_eq!(
                    config.connection.api_token.unwrap().expose_secret(),
                    "ptr_abc"
                );
                assert_eq!(config.connection.environment_id, 7);
                assert_eq!(
                    config.scopes,
                    Some(vec!["K8sSecretsW".to_string(), "K8sIngressesW".to_string()])
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_builder_values_win_over_env() {
        clean_env(
            &[
                ("FLEETDECK_BASE_URL", Some("https://env.example.com")),
                ("FLEETDECK_ENVIRONMENT_ID", Some("3")),
            ],
            || {
                let config = ConfigLoader::new()
                    .with_base_url("https://cli.example.com".to_string())
                    .from_env()
                    .unwrap()
                    .build()
                    .unwrap();
                assert_eq!(config.connection.base_url, "https://cli.example.com");
                assert_eq!(config.connection.environment_id, 3);
            },
        );
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_env_is_reported() {
        clean_env(&[("FLEETDECK_TIMEOUT", Some("soon"))], || {
            let err = ConfigLoader::new().from_env().err().unwrap();
            assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "FLEETDECK_TIMEOUT"));
        });
    }

    #[test]
    fn test_missing_base_url() {
        let err = ConfigLoader::new().build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = ConfigLoader::new()
            .with_base_url("ftp://deck.example.com".to_string())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_timeout_bounds() {
        let zero = ConfigLoader::new()
            .with_base_url("https://deck.example.com".to_string())
            .with_timeout(Duration::from_secs(0))
            .build();
        assert!(matches!(zero, Err(ConfigError::InvalidTimeout { .. })));

        let huge = ConfigLoader::new()
            .with_base_url("https://deck.example.com".to_string())
            .with_timeout(Duration::from_secs(MAX_TIMEOUT_SECS + 1))
            .build();
        assert!(matches!(huge, Err(ConfigError::InvalidTimeout { .. })));
    }

    #[test]
    fn test_max_retries_bound() {
        let result = ConfigLoader::new()
            .with_base_url("https://deck.example.com".to_string())
            .with_max_retries(MAX_MAX_RETRIES + 1)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidMaxRetries { .. })));
    }

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new()
            .with_base_url("http://localhost:9000".to_string())
            .build()
            .unwrap();
        assert_eq!(config.connection.environment_id, 1);
        assert_eq!(config.connection.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(
            config.connection.timeout,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert!(config.connection.api_token.is_none());
        assert!(config.scopes.is_none());
    }
}
