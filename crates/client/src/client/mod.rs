//! Management API client.
//!
//! This module provides the primary [`FleetClient`]: a cheap-to-clone handle
//! bound to one server, one API key, and one environment.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//!
//! # What this module does NOT handle:
//! - Direct HTTP request implementation (delegated to [`crate::endpoints`])
//! - Polling, memoization, or selection state (see the `fleetdeck-table` crate)
//!
//! # Invariants
//! - Every method takes `&self`; concurrent calls share one connection pool.
//! - Environment-scoped paths always use [`FleetClient::environment_id`].

pub mod builder;

use secrecy::{ExposeSecret, SecretString};

use crate::endpoints;
use crate::error::Result;
use crate::models::{EnvironmentId, ListFilter, Namespace, Resource, ResourceKind, Workload};

/// Management API client.
///
/// ```rust,ignore
/// use fleetdeck_client::FleetClient;
///
/// let client = FleetClient::builder()
///     .base_url("https://deck.example.com:9443".to_string())
///     .api_key(SecretString::new("ptr_xxx".to_string().into()))
///     .environment_id(3)
///     .build()?;
/// let secrets = client.list(ResourceKind::KubeSecret, &ListFilter::all()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct FleetClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: SecretString,
    pub(crate) environment_id: EnvironmentId,
    pub(crate) max_retries: usize,
}

impl FleetClient {
    /// Create a new client builder.
    pub fn builder() -> builder::FleetClientBuilder {
        builder::FleetClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn environment_id(&self) -> EnvironmentId {
        self.environment_id
    }

    /// A handle to the same server bound to another environment.
    pub fn for_environment(&self, environment_id: EnvironmentId) -> Self {
        Self {
            environment_id,
            ..self.clone()
        }
    }

    pub async fn list(&self, kind: ResourceKind, filter: &ListFilter) -> Result<Vec<Resource>> {
        endpoints::list_resources(
            &self.http,
            &self.base_url,
            self.api_key.expose_secret(),
            self.environment_id,
            kind,
            filter,
            self.max_retries,
        )
        .await
    }

    pub async fn delete(&self, kind: ResourceKind, targets: &[Resource]) -> Result<()> {
        endpoints::delete_resources(
            &self.http,
            &self.base_url,
            self.api_key.expose_secret(),
            self.environment_id,
            kind,
            targets,
            self.max_retries,
        )
        .await
    }

    pub async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        endpoints::list_namespaces(
            &self.http,
            &self.base_url,
            self.api_key.expose_secret(),
            self.environment_id,
            self.max_retries,
        )
        .await
    }

    pub async fn list_workloads(&self) -> Result<Vec<Workload>> {
        endpoints::list_workloads(
            &self.http,
            &self.base_url,
            self.api_key.expose_secret(),
            self.environment_id,
            self.max_retries,
        )
        .await
    }
}
