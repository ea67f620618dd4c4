//! Workloads, used only to derive whether a configuration resource is in use.

use serde::{Deserialize, Serialize};

use crate::serde_helpers::null_as_default;

/// A deployed application and the configuration objects it mounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub name: String,
    pub namespace: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secret_refs: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config_map_refs: Vec<String>,
}

impl Workload {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            secret_refs: Vec::new(),
            config_map_refs: Vec::new(),
        }
    }

    pub fn with_secret(mut self, name: impl Into<String>) -> Self {
        self.secret_refs.push(name.into());
        self
    }

    pub fn with_config_map(mut self, name: impl Into<String>) -> Self {
        self.config_map_refs.push(name.into());
        self
    }
}
