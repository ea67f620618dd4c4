//! Shared fixtures for table integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use fleetdeck_client::Resource;
use fleetdeck_config::SettingsStore;
use fleetdeck_table::testing::RecordingNotifier;
use fleetdeck_table::{Authorizations, EnvironmentContext, TableContext};

pub fn context(auth: Authorizations) -> (TableContext, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let ctx = TableContext {
        store: Arc::new(SettingsStore::in_memory()),
        auth,
        notifier: notifier.clone(),
        environments: Arc::new(EnvironmentContext::default()),
    };
    (ctx, notifier)
}

pub fn namespaced(ns: &str, name: &str) -> Resource {
    Resource::new(name).in_namespace(ns)
}

/// Let spawned fetch tasks run to completion on the current-thread runtime.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
