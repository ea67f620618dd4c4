//! Bulk delete through a mounted table: partitions, notifications, selection.

mod common;

use std::sync::Arc;

use common::{context, namespaced};
use fleetdeck_client::{ListFilter, Resource, ResourceKey, ResourceKind};
use fleetdeck_table::auth::scopes;
use fleetdeck_table::testing::MockResourceApi;
use fleetdeck_table::{
    ActionState, Authorizations, BulkError, PartitionPolicy, ResourceTable, SelectionMode,
    SelectionState,
};

#[tokio::test]
async fn test_delete_two_of_three_secrets() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::KubeSecret,
        vec![
            namespaced("default", "alpha"),
            namespaced("default", "bravo"),
            namespaced("default", "charlie"),
        ],
    ));
    let (ctx, notifier) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::KubeSecret, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;

    let rows = table.rows().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(table.delete_action(), ActionState::Disabled);
    assert!(table.selection_mut().check(&rows[0]));
    assert!(table.selection_mut().check(&rows[1]));
    assert_eq!(table.selection().state(), SelectionState::HasSelection);
    assert_eq!(table.delete_action(), ActionState::Enabled);

    let pending = table.request_delete().unwrap();
    assert_eq!(
        pending.message(),
        "Are you sure you want to remove the selected 2 secrets?"
    );

    let mut datasets = table.subscribe();
    let _ = datasets.borrow_and_update();
    let report = table.confirm_delete(pending).await;

    assert!(report.is_success());
    assert!(report.refreshed);
    assert_eq!(report.removed.len(), 2);
    assert_eq!(table.selection().state(), SelectionState::Empty);

    let successes = notifier.successes();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].title, "Secrets successfully removed");
    assert_eq!(successes[0].message, "alpha, bravo");
    assert!(notifier.errors().is_empty());

    // One batched call for the native batch endpoint.
    assert_eq!(api.delete_calls().len(), 1);

    datasets.changed().await.unwrap();
    assert_eq!(api.list_calls(ResourceKind::KubeSecret), 2);
    let rows = table.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].resource.name, "charlie");
}

#[tokio::test]
async fn test_ingress_failure_in_one_namespace_keeps_its_rows_selected() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::KubeIngress,
        vec![namespaced("shop", "storefront"), namespaced("web", "public")],
    ));
    api.fail_deletes_in("web");
    let (ctx, notifier) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::KubeIngress, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;

    let rows = table.rows().unwrap();
    table.selection_mut().toggle_all(&rows);
    assert_eq!(table.selection().len(), 2);

    let pending = table.request_delete().unwrap();
    let report = table.confirm_delete(pending).await;

    assert!(report.is_partial());
    assert!(!report.refreshed);
    assert_eq!(report.removed, vec![ResourceKey::namespaced("shop", "storefront")]);

    let selection = table.selection();
    assert!(selection.is_selected(&ResourceKey::namespaced("web", "public")));
    assert!(!selection.is_selected(&ResourceKey::namespaced("shop", "storefront")));
    assert_eq!(selection.len(), 1);

    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "Failure");
    assert!(
        errors[0].message.starts_with("Unable to remove ingresses in web:"),
        "unexpected message: {}",
        errors[0].message
    );

    // One call per namespace; no re-fetch after a partial failure.
    assert_eq!(api.delete_calls().len(), 2);
    assert_eq!(api.list_calls(ResourceKind::KubeIngress), 1);
}

#[tokio::test]
async fn test_repeated_failure_keeps_row_selected() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::KubeIngress,
        vec![namespaced("shop", "storefront"), namespaced("web", "public")],
    ));
    api.fail_deletes_of("public");
    let (ctx, notifier) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::KubeIngress, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;
    let rows = table.rows().unwrap();
    table.selection_mut().toggle_all(&rows);

    let pending = table.request_delete().unwrap();
    table.confirm_delete(pending).await;
    assert_eq!(table.selection().len(), 1);

    // Second attempt fails again and still leaves the row selected.
    let pending = table.request_delete().unwrap();
    assert_eq!(pending.len(), 1);
    let report = table.confirm_delete(pending).await;
    assert!(!report.is_success());
    assert_eq!(table.selection().len(), 1);
    assert_eq!(notifier.errors().len(), 2);
}

#[tokio::test]
async fn test_empty_selection_is_a_no_op() {
    let api = Arc::new(
        MockResourceApi::new()
            .with_resources(ResourceKind::DockerSecret, vec![Resource::new("token")]),
    );
    let (ctx, _notifier) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::DockerSecret, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;

    assert_eq!(table.request_delete().unwrap_err(), BulkError::EmptySelection);
    assert!(api.delete_calls().is_empty());
}

#[tokio::test]
async fn test_missing_write_scope_makes_kube_table_view_only() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::KubeConfigMap,
        vec![namespaced("default", "app-config")],
    ));
    let (ctx, _notifier) = context(Authorizations::with_scopes(["K8sConfigMapsR"]));
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::KubeConfigMap, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;

    assert_eq!(table.selection().mode(), SelectionMode::ViewOnly);
    let rows = table.rows().unwrap();
    assert!(!table.selection_mut().check(&rows[0]));
    assert!(matches!(
        table.request_delete(),
        Err(BulkError::NotAuthorized { .. })
    ));
}

#[tokio::test]
async fn test_missing_write_scope_disables_docker_delete_but_keeps_checkboxes() {
    let api = Arc::new(
        MockResourceApi::new()
            .with_resources(ResourceKind::DockerConfig, vec![Resource::new("nginx.conf")]),
    );
    let (ctx, _notifier) = context(Authorizations::with_scopes(["DockerConfigsR"]));
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::DockerConfig, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;

    let rows = table.rows().unwrap();
    assert!(table.selection_mut().check(&rows[0]));
    assert_eq!(table.delete_action(), ActionState::Disabled);
    assert_eq!(
        table.request_delete().unwrap_err(),
        BulkError::NotAuthorized {
            scope: scopes::DOCKER_CONFIGS_W,
            plural: "configs",
        }
    );
}

#[tokio::test]
async fn test_partition_policy_override_splits_secret_batch() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::KubeSecret,
        vec![namespaced("a", "one"), namespaced("b", "two")],
    ));
    let (ctx, _notifier) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::KubeSecret, ListFilter::all(), &ctx)
            .unwrap()
            .with_partition_policy(PartitionPolicy::PerNamespace);
    table.load().await;
    let rows = table.rows().unwrap();
    table.selection_mut().toggle_all(&rows);

    let pending = table.request_delete().unwrap();
    let report = table.confirm_delete(pending).await;
    assert!(report.is_success());
    assert_eq!(api.delete_calls().len(), 2);
}

#[tokio::test]
async fn test_deleting_active_environment_forgets_it() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::Environment,
        vec![
            Resource::new("local").with_id("1"),
            Resource::new("edge-west").with_id("4"),
        ],
    ));
    let (ctx, notifier) = context(Authorizations::unrestricted());
    ctx.environments.set(Some(4));
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::Environment, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;

    let rows = table.rows().unwrap();
    let edge = rows
        .iter()
        .find(|r| r.resource.name == "edge-west")
        .unwrap()
        .clone();
    table.selection_mut().check(&edge);

    let pending = table.request_delete().unwrap();
    let report = table.confirm_delete(pending).await;
    assert!(report.is_success());
    assert_eq!(ctx.environments.current(), None);
    assert_eq!(notifier.successes()[0].title, "Environments successfully removed");
}

#[tokio::test]
async fn test_single_batch_on_docker_secrets_still_reports_per_key() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::DockerSecret,
        vec![Resource::new("a").with_id("a1"), Resource::new("b").with_id("b2")],
    ));
    api.fail_deletes_of("b");
    let (ctx, notifier) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::DockerSecret, ListFilter::all(), &ctx)
            .unwrap()
            .with_partition_policy(PartitionPolicy::SingleBatch);
    table.load().await;
    assert_eq!(table.partition_policy(), PartitionPolicy::PerKey);

    let rows = table.rows().unwrap();
    table.selection_mut().toggle_all(&rows);
    let pending = table.request_delete().unwrap();
    let report = table.confirm_delete(pending).await;

    assert!(report.is_partial());
    assert_eq!(report.removed, vec![ResourceKey::global("a")]);
    assert_eq!(
        report.failed_keys().cloned().collect::<Vec<_>>(),
        vec![ResourceKey::global("b")]
    );
    assert!(!table.selection().is_selected(&ResourceKey::global("a")));
    assert!(table.selection().is_selected(&ResourceKey::global("b")));

    assert_eq!(api.delete_calls().len(), 2);
    assert_eq!(notifier.successes().len(), 1);
    assert_eq!(notifier.successes()[0].message, "a");
    assert_eq!(notifier.errors().len(), 1);
}

#[tokio::test]
async fn test_delete_action_disabled_after_dataset_changes() {
    let api = Arc::new(MockResourceApi::new().with_resources(
        ResourceKind::KubeSecret,
        vec![namespaced("default", "alpha")],
    ));
    let (ctx, _notifier) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::KubeSecret, ListFilter::all(), &ctx)
            .unwrap();
    table.load().await;

    let rows = table.rows().unwrap();
    assert!(table.selection_mut().check(&rows[0]));
    assert_eq!(table.delete_action(), ActionState::Enabled);

    api.set_resources(
        ResourceKind::KubeSecret,
        vec![namespaced("default", "alpha"), namespaced("default", "bravo")],
    );
    table.refresh().await;

    // No rows() call in between: the action itself notices the new dataset.
    assert_eq!(table.delete_action(), ActionState::Disabled);
    assert_eq!(table.selection().state(), SelectionState::Empty);
}
