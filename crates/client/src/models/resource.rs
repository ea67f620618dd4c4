//! Resource rows, keys, and namespaces.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::ResourceKind;
use crate::serde_helpers::{null_as_default, string_from_number_or_string};

/// Numeric identifier of a managed environment.
pub type EnvironmentId = u64;

/// Identity of a row within one resource kind.
///
/// Namespaced kinds are keyed by `(namespace, name)`; the rest by name.
/// Rendered as `namespace/name` when a namespace is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceKey {
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns}/{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for ResourceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let key = match s.split_once('/') {
            Some((ns, name)) => Self::namespaced(ns, name),
            None => Self::global(s),
        };
        if key.name.is_empty() || key.namespace.as_deref() == Some("") {
            return Err(format!("invalid resource key '{s}'"));
        }
        Ok(key)
    }
}

/// One row of a list view as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Backend identifier. Docker objects and environments are deleted by id.
    #[serde(default, deserialize_with = "string_from_number_or_string")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub labels: BTreeMap<String, String>,
    /// Kind-specific subtype, e.g. `Opaque` for secrets or the ingress class.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            namespace: None,
            created_at: None,
            labels: BTreeMap::new(),
            resource_type: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Key identifying this row for selection and deletion.
    pub fn key(&self, kind: ResourceKind) -> ResourceKey {
        if kind.is_namespaced() {
            ResourceKey {
                namespace: self.namespace.clone(),
                name: self.name.clone(),
            }
        } else {
            ResourceKey::global(self.name.clone())
        }
    }
}

/// A namespace and whether the platform reserves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub name: String,
    #[serde(default, rename = "IsSystem", alias = "isSystem")]
    pub is_system: bool,
}

/// Optional narrowing applied to list requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Restrict to these namespaces. Empty means all.
    pub namespaces: Vec<String>,
}

impl ListFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn namespaces<I, S>(namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display_and_parse() {
        let key: ResourceKey = "default/db-creds".parse().unwrap();
        assert_eq!(key, ResourceKey::namespaced("default", "db-creds"));
        assert_eq!(key.to_string(), "default/db-creds");

        let key: ResourceKey = "registry-token".parse().unwrap();
        assert_eq!(key.namespace, None);
        assert!("/x".parse::<ResourceKey>().is_err());
        assert!("ns/".parse::<ResourceKey>().is_err());
    }

    #[test]
    fn test_key_ignores_namespace_for_global_kinds() {
        let res = Resource::new("token").in_namespace("swarm");
        assert_eq!(
            res.key(ResourceKind::DockerSecret),
            ResourceKey::global("token")
        );
        assert_eq!(
            res.key(ResourceKind::KubeSecret),
            ResourceKey::namespaced("swarm", "token")
        );
    }

    #[test]
    fn test_resource_deserializes_api_shape() {
        let json = r#"{
            "id": "abc",
            "name": "db-creds",
            "namespace": "default",
            "createdAt": "2024-03-01T10:00:00Z",
            "labels": {"app": "api"},
            "type": "Opaque"
        }"#;
        let res: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(res.resource_type.as_deref(), Some("Opaque"));
        assert_eq!(res.labels.get("app").map(String::as_str), Some("api"));
        assert!(res.created_at.is_some());
    }

    #[test]
    fn test_namespace_accepts_both_flag_spellings() {
        let a: Namespace = serde_json::from_str(r#"{"name":"kube-system","IsSystem":true}"#).unwrap();
        let b: Namespace = serde_json::from_str(r#"{"name":"kube-system","isSystem":true}"#).unwrap();
        assert!(a.is_system && b.is_system);
    }
}
