//! Client builder for constructing [`FleetClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Validating required configuration (base_url, api_key)
//! - Normalizing the base URL (removing trailing slashes)
//! - Configuring the underlying HTTP client (timeouts, TLS verification)
//!
//! # What this module does NOT handle:
//! - Actual API calls (handled by [`FleetClient`] methods in `mod.rs`)
//! - Reading configuration from the environment (see `fleetdeck_config::ConfigLoader`)
//!
//! # Invariants
//! - `base_url` and `api_key` must be provided before calling `build()`
//! - The base URL is always normalized to have no trailing slashes
//! - `skip_verify` only affects HTTPS connections; HTTP connections log a warning

use std::time::Duration;

use fleetdeck_config::{
    Config,
    constants::{DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_SECS},
};
use secrecy::SecretString;

use crate::client::FleetClient;
use crate::error::{ClientError, Result};
use crate::models::EnvironmentId;

/// Builder for creating a new [`FleetClient`].
pub struct FleetClientBuilder {
    base_url: Option<String>,
    api_key: Option<SecretString>,
    environment_id: EnvironmentId,
    skip_verify: bool,
    timeout: Duration,
    max_retries: usize,
}

impl Default for FleetClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            environment_id: 1,
            skip_verify: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl FleetClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL of the management server.
    ///
    /// Trailing slashes will be automatically removed.
    pub fn base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    pub fn api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn environment_id(mut self, id: EnvironmentId) -> Self {
        self.environment_id = id;
        self
    }

    /// Set whether to skip TLS certificate verification.
    ///
    /// Only affects HTTPS connections. For HTTP URLs a warning is logged.
    pub fn skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Set the request timeout. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retries for rate-limited requests.
    ///
    /// Default is 3 retries with exponential backoff (1s, 2s, 4s delays).
    pub fn max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    /// Create a client builder from configuration.
    pub fn from_config(mut self, config: &Config) -> Self {
        let conn = &config.connection;
        self.base_url = Some(conn.base_url.clone());
        self.api_key = conn.api_token.clone();
        self.environment_id = conn.environment_id;
        self.skip_verify = conn.skip_verify;
        self.timeout = conn.timeout;
        self.max_retries = conn.max_retries;
        self
    }

    /// Normalize a base URL by removing trailing slashes.
    ///
    /// - `"https://deck.example.com:9443/"` -> `"https://deck.example.com:9443"`
    fn normalize_base_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Build the [`FleetClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` was not provided.
    /// Returns [`ClientError::Unauthorized`] if no API key was provided.
    /// Returns `ClientError::HttpError` if the HTTP client fails to build.
    pub fn build(self) -> Result<FleetClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::InvalidUrl("base_url is required".to_string()))?;
        let base_url = Self::normalize_base_url(base_url);

        let api_key = self
            .api_key
            .ok_or_else(|| ClientError::Unauthorized("an API key is required".to_string()))?;

        let mut http_builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(DEFAULT_MAX_REDIRECTS));

        if self.skip_verify {
            if base_url.starts_with("https://") {
                http_builder = http_builder.danger_accept_invalid_certs(true);
            } else {
                tracing::warn!(
                    "skip_verify=true has no effect on HTTP URLs. TLS verification only applies to HTTPS connections."
                );
            }
        }

        let http = http_builder.build()?;

        Ok(FleetClient {
            http,
            base_url,
            api_key,
            environment_id: self.environment_id,
            max_retries: self.max_retries,
        })
    }
}
