//! The seam between list views and the network.
//!
//! Table controllers are generic over [`ResourceApi`] so they can be driven by
//! a [`FleetClient`] in production and by an in-memory double in tests.

use std::future::Future;

use crate::client::FleetClient;
use crate::error::Result;
use crate::models::{ListFilter, Namespace, Resource, ResourceKind, Workload};

/// Data operations a list view needs from the backend.
pub trait ResourceApi: Send + Sync + 'static {
    /// List every resource of `kind`.
    fn list(
        &self,
        kind: ResourceKind,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Vec<Resource>>> + Send;

    /// Delete `targets` in one backend operation.
    fn delete(
        &self,
        kind: ResourceKind,
        targets: &[Resource],
    ) -> impl Future<Output = Result<()>> + Send;

    fn list_namespaces(&self) -> impl Future<Output = Result<Vec<Namespace>>> + Send;

    fn list_workloads(&self) -> impl Future<Output = Result<Vec<Workload>>> + Send;
}

impl ResourceApi for FleetClient {
    fn list(
        &self,
        kind: ResourceKind,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Vec<Resource>>> + Send {
        FleetClient::list(self, kind, filter)
    }

    fn delete(
        &self,
        kind: ResourceKind,
        targets: &[Resource],
    ) -> impl Future<Output = Result<()>> + Send {
        FleetClient::delete(self, kind, targets)
    }

    fn list_namespaces(&self) -> impl Future<Output = Result<Vec<Namespace>>> + Send {
        FleetClient::list_namespaces(self)
    }

    fn list_workloads(&self) -> impl Future<Output = Result<Vec<Workload>>> + Send {
        FleetClient::list_workloads(self)
    }
}
