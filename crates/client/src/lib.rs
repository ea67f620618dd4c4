//! Management API client.
//!
//! This crate provides a typed client for listing and deleting the resources
//! shown in fleetdeck's list views: Kubernetes secrets, ConfigMaps and
//! ingresses, Docker secrets and configs, and environments.

pub mod api;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
mod serde_helpers;

pub use api::ResourceApi;
pub use client::FleetClient;
pub use client::builder::FleetClientBuilder;
pub use error::{ClientError, Result};
pub use models::{
    DeleteStyle, EnvironmentId, ListFilter, Namespace, Resource, ResourceKey, ResourceKind,
    Workload,
};
