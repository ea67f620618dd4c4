//! The environment the session is currently working in.

use std::sync::Mutex;

use fleetdeck_client::EnvironmentId;
use tracing::info;

/// Shared holder of the active environment id.
#[derive(Debug, Default)]
pub struct EnvironmentContext {
    current: Mutex<Option<EnvironmentId>>,
}

impl EnvironmentContext {
    pub fn new(current: Option<EnvironmentId>) -> Self {
        Self {
            current: Mutex::new(current),
        }
    }

    pub fn current(&self) -> Option<EnvironmentId> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set(&self, id: Option<EnvironmentId>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = id;
    }

    /// Clear the active environment if it is among `removed`.
    /// Returns true if it was cleared.
    pub fn forget_if_removed(&self, removed: &[EnvironmentId]) -> bool {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        match *current {
            Some(id) if removed.contains(&id) => {
                info!(environment_id = id, "Active environment was removed");
                *current = None;
                true
            }
            _ => false,
        }
    }
}
