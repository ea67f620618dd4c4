//! Data models for management API responses.
//!
//! This module provides the normalized shapes the API returns for list
//! views. Types are organized by concern in submodules and re-exported here
//! for convenient access.

pub mod kind;
pub mod resource;
pub mod workload;

pub use kind::{DeleteStyle, ResourceKind};
pub use resource::{EnvironmentId, ListFilter, Namespace, Resource, ResourceKey};
pub use workload::Workload;
