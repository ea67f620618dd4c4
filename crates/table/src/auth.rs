//! Authorization context passed explicitly to table controllers.
//!
//! Responsibilities:
//! - Answer `has_authorization(scope)` for the current session.
//! - Derive the gating of delete actions and row selection per resource kind.
//!
//! Does NOT handle:
//! - Obtaining scopes from the server (the caller supplies them).
//!
//! Invariants:
//! - A missing capability disables an action; it never hides it. The one
//!   exception is view-only mode, which suppresses row selection entirely.

use std::collections::BTreeSet;

use fleetdeck_client::ResourceKind;

/// Scope names understood by the table controllers.
pub mod scopes {
    pub const K8S_ACCESS_SYSTEM_NAMESPACES: &str = "K8sAccessSystemNamespaces";
    pub const K8S_SECRETS_W: &str = "K8sSecretsW";
    pub const K8S_CONFIG_MAPS_W: &str = "K8sConfigMapsW";
    pub const K8S_INGRESSES_W: &str = "K8sIngressesW";
    pub const DOCKER_SECRETS_W: &str = "DockerSecretsW";
    pub const DOCKER_CONFIGS_W: &str = "DockerConfigsW";
    pub const ENDPOINTS_W: &str = "EndpointsW";
}

/// Whether an action is offered as usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Enabled,
    Disabled,
}

impl ActionState {
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// Whether rows carry selection checkboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Selectable,
    ViewOnly,
}

/// Session-scoped, read-only set of granted scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorizations {
    /// `None` grants everything (administrator sessions).
    granted: Option<BTreeSet<String>>,
}

impl Authorizations {
    pub fn unrestricted() -> Self {
        Self { granted: None }
    }

    pub fn with_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            granted: Some(scopes.into_iter().map(Into::into).collect()),
        }
    }

    /// Build from the configured scope list; `None` means unrestricted.
    pub fn from_config(scopes: Option<&[String]>) -> Self {
        match scopes {
            Some(list) => Self::with_scopes(list.iter().cloned()),
            None => Self::unrestricted(),
        }
    }

    pub fn has_authorization(&self, scope: &str) -> bool {
        match &self.granted {
            None => true,
            Some(set) => set.contains(scope),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.granted.is_none()
    }

    pub fn can_view_system_namespaces(&self) -> bool {
        self.has_authorization(scopes::K8S_ACCESS_SYSTEM_NAMESPACES)
    }

    pub fn delete_action(&self, kind: ResourceKind) -> ActionState {
        if self.has_authorization(kind.write_scope()) {
            ActionState::Enabled
        } else {
            ActionState::Disabled
        }
    }

    /// Kubernetes views drop their checkboxes when the session cannot write;
    /// other views keep them and only disable the action.
    pub fn selection_mode(&self, kind: ResourceKind) -> SelectionMode {
        if kind.is_kubernetes() && !self.delete_action(kind).is_enabled() {
            SelectionMode::ViewOnly
        } else {
            SelectionMode::Selectable
        }
    }
}

impl Default for Authorizations {
    fn default() -> Self {
        Self::unrestricted()
    }
}
