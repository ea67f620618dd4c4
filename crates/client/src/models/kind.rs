//! Resource kinds managed through list views.
//!
//! Each kind carries everything that differs between list views of the
//! same shape: REST paths, display nouns, the authorization scope that
//! gates mutation, and how the backend accepts deletes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the backend accepts a delete of several keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStyle {
    /// One POST carrying every `{namespace, name}` pair.
    BatchKeys,
    /// One POST carrying `{namespace: [names]}`.
    GroupedByNamespace,
    /// One DELETE per key.
    PerKey,
    /// One POST carrying `{endpoints: [{id}]}`.
    EnvironmentIds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    KubeSecret,
    KubeConfigMap,
    KubeIngress,
    DockerSecret,
    DockerConfig,
    Environment,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        Self::KubeSecret,
        Self::KubeConfigMap,
        Self::KubeIngress,
        Self::DockerSecret,
        Self::DockerConfig,
        Self::Environment,
    ];

    /// Name used on the command line and in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KubeSecret => "k8s-secrets",
            Self::KubeConfigMap => "k8s-configmaps",
            Self::KubeIngress => "k8s-ingresses",
            Self::DockerSecret => "docker-secrets",
            Self::DockerConfig => "docker-configs",
            Self::Environment => "environments",
        }
    }

    /// Storage key of the list view's persisted settings.
    pub fn table_key(self) -> &'static str {
        match self {
            Self::KubeSecret => "k8sSecretsDatatable",
            Self::KubeConfigMap => "k8sConfigMapsDatatable",
            Self::KubeIngress => "ingressClassesNameSpace",
            Self::DockerSecret => "docker-secrets",
            Self::DockerConfig => "docker-configs",
            Self::Environment => "environments",
        }
    }

    pub fn is_kubernetes(self) -> bool {
        matches!(
            self,
            Self::KubeSecret | Self::KubeConfigMap | Self::KubeIngress
        )
    }

    /// Whether rows are partitioned by namespace.
    pub fn is_namespaced(self) -> bool {
        self.is_kubernetes()
    }

    /// Whether workloads can reference this kind, making the in-use flag meaningful.
    pub fn tracks_usage(self) -> bool {
        matches!(self, Self::KubeSecret | Self::KubeConfigMap)
    }

    /// Singular display noun.
    pub fn noun(self) -> &'static str {
        match self {
            Self::KubeSecret | Self::DockerSecret => "secret",
            Self::KubeConfigMap => "ConfigMap",
            Self::KubeIngress => "ingress",
            Self::DockerConfig => "config",
            Self::Environment => "environment",
        }
    }

    /// Plural display noun.
    pub fn plural(self) -> &'static str {
        match self {
            Self::KubeSecret | Self::DockerSecret => "secrets",
            Self::KubeConfigMap => "ConfigMaps",
            Self::KubeIngress => "ingresses",
            Self::DockerConfig => "configs",
            Self::Environment => "environments",
        }
    }

    /// Capitalized plural used in notification titles.
    pub fn title(self) -> &'static str {
        match self {
            Self::KubeSecret | Self::DockerSecret => "Secrets",
            Self::KubeConfigMap => "ConfigMaps",
            Self::KubeIngress => "Ingresses",
            Self::DockerConfig => "Configs",
            Self::Environment => "Environments",
        }
    }

    /// Authorization scope required to create or delete this kind.
    pub fn write_scope(self) -> &'static str {
        match self {
            Self::KubeSecret => "K8sSecretsW",
            Self::KubeConfigMap => "K8sConfigMapsW",
            Self::KubeIngress => "K8sIngressesW",
            Self::DockerSecret => "DockerSecretsW",
            Self::DockerConfig => "DockerConfigsW",
            Self::Environment => "EndpointsW",
        }
    }

    pub fn delete_style(self) -> DeleteStyle {
        match self {
            Self::KubeSecret | Self::KubeConfigMap => DeleteStyle::BatchKeys,
            Self::KubeIngress => DeleteStyle::GroupedByNamespace,
            Self::DockerSecret | Self::DockerConfig => DeleteStyle::PerKey,
            Self::Environment => DeleteStyle::EnvironmentIds,
        }
    }

    /// Collection path relative to the API root, for environment `env`.
    pub fn collection_path(self, env: u64) -> String {
        match self {
            Self::KubeSecret => format!("/api/kubernetes/{env}/secrets"),
            Self::KubeConfigMap => format!("/api/kubernetes/{env}/configmaps"),
            Self::KubeIngress => format!("/api/kubernetes/{env}/ingresses"),
            Self::DockerSecret => format!("/api/endpoints/{env}/docker/secrets"),
            Self::DockerConfig => format!("/api/endpoints/{env}/docker/configs"),
            Self::Environment => "/api/endpoints".to_string(),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "k8s-secrets" | "secrets" => Ok(Self::KubeSecret),
            "k8s-configmaps" | "configmaps" => Ok(Self::KubeConfigMap),
            "k8s-ingresses" | "ingresses" => Ok(Self::KubeIngress),
            "docker-secrets" => Ok(Self::DockerSecret),
            "docker-configs" => Ok(Self::DockerConfig),
            "environments" | "endpoints" => Ok(Self::Environment),
            other => Err(format!(
                "unknown resource kind '{other}' (expected one of: {})",
                Self::ALL.map(Self::as_str).join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_aliases_and_unknown() {
        assert_eq!("Secrets".parse::<ResourceKind>(), Ok(ResourceKind::KubeSecret));
        let err = "pods".parse::<ResourceKind>().unwrap_err();
        assert!(err.contains("k8s-configmaps"));
    }

    #[test]
    fn test_table_keys_are_unique() {
        let mut keys: Vec<_> = ResourceKind::ALL.iter().map(|k| k.table_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ResourceKind::ALL.len());
    }

    #[test]
    fn test_paths() {
        assert_eq!(
            ResourceKind::KubeIngress.collection_path(3),
            "/api/kubernetes/3/ingresses"
        );
        assert_eq!(
            ResourceKind::DockerConfig.collection_path(3),
            "/api/endpoints/3/docker/configs"
        );
        assert_eq!(ResourceKind::Environment.collection_path(3), "/api/endpoints");
    }
}
