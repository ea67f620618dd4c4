//! Table framework for fleetdeck list views.
//!
//! A mounted [`ResourceTable`] binds its persisted settings, polls its data
//! sources at the configured rate, derives memoized rows, and runs confirmed
//! bulk deletes of the selected rows. The pieces are usable on their own:
//!
//! - [`settings`]: per-table settings bound to the persisted store.
//! - [`polling`]: interval-driven refresh with at most one call pending.
//! - [`sync`]: coalescing fetch state with last-known-good data.
//! - [`view_model`]: row derivation (in-use flag, system namespaces, sort).
//! - [`selection`] and [`bulk`]: checked rows and partitioned bulk delete.
//! - [`auth`]: scope checks that gate actions and selection.
//! - [`notify`]: fire-and-forget outcome notifications.
//! - [`deploy_form`]: deploy-from-template form validation.

pub mod auth;
pub mod bulk;
pub mod controller;
pub mod deploy_form;
pub mod environment;
pub mod notify;
pub mod polling;
pub mod selection;
pub mod settings;
pub mod sync;
pub mod view_model;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{ActionState, Authorizations, SelectionMode};
pub use bulk::{
    BulkDeleteController, BulkError, BulkReport, PartitionPolicy, PendingDelete, confirm_message,
    pluralize,
};
pub use controller::{ResourceTable, TableContext, table_id};
pub use deploy_form::{DeployContext, DeployFormValues, ValidationErrors};
pub use environment::EnvironmentContext;
pub use notify::{ChannelNotifier, Notification, NotificationSink, ToastLevel, TracingNotifier};
pub use polling::Repeater;
pub use selection::{Selection, SelectionState};
pub use settings::TableState;
pub use sync::{Refresher, ResourceSync, SyncSnapshot, Versioned};
pub use view_model::{ResourceRow, ViewModelBuilder};
