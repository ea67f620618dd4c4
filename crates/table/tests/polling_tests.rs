//! Polling a mounted table under paused time.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::context;
use fleetdeck_client::{ListFilter, Resource, ResourceKind};
use fleetdeck_table::testing::MockResourceApi;
use fleetdeck_table::{Authorizations, ResourceTable};

fn docker_api() -> Arc<MockResourceApi> {
    Arc::new(
        MockResourceApi::new()
            .with_resources(ResourceKind::DockerConfig, vec![Resource::new("nginx.conf")]),
    )
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_never_overlaps() {
    let api = docker_api();
    api.set_list_delay(Duration::from_secs(5));
    let (ctx, _) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::DockerConfig, ListFilter::all(), &ctx)
            .unwrap();

    table.settings().set_auto_refresh_rate(1);
    table.start_polling();

    // A user refresh racing the poll is coalesced, not run alongside it.
    tokio::time::sleep(Duration::from_millis(1_500)).await;
    let manual = table.refresh();
    tokio::time::sleep(Duration::from_secs(20)).await;
    manual.await;

    assert_eq!(api.max_concurrent_lists(), 1);
    // Each cycle is one 1s wait plus one 5s fetch.
    let calls = api.list_calls(ResourceKind::DockerConfig);
    assert!((3..=5).contains(&calls), "unexpected call count {calls}");

    table.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_rate_schedules_nothing_until_enabled() {
    let api = docker_api();
    let (ctx, _) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::DockerConfig, ListFilter::all(), &ctx)
            .unwrap();

    assert_eq!(table.settings().settings().auto_refresh_rate, 0);
    table.start_polling();
    tokio::time::sleep(Duration::from_secs(3_600)).await;
    assert_eq!(api.list_calls(ResourceKind::DockerConfig), 0);

    table.settings().set_auto_refresh_rate(10);
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    assert_eq!(api.list_calls(ResourceKind::DockerConfig), 1);

    table.settings().set_auto_refresh_rate(0);
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(api.list_calls(ResourceKind::DockerConfig), 1);
    assert!(table.is_polling());

    table.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_polling_and_discards_in_flight_results() {
    let api = docker_api();
    api.set_list_delay(Duration::from_secs(5));
    let (ctx, _) = context(Authorizations::unrestricted());
    let mut table =
        ResourceTable::mount(api.clone(), ResourceKind::DockerConfig, ListFilter::all(), &ctx)
            .unwrap();
    let datasets = table.subscribe();

    table.settings().set_auto_refresh_rate(10);
    table.start_polling();
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(api.list_calls(ResourceKind::DockerConfig), 1);

    // The fetch started at 10s is still running.
    table.unmount().await;
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(api.list_calls(ResourceKind::DockerConfig), 1);
    assert!(datasets.borrow().data.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_rate_persists_for_next_mount() {
    let api = docker_api();
    let (ctx, _) = context(Authorizations::unrestricted());
    let table =
        ResourceTable::mount(api.clone(), ResourceKind::DockerConfig, ListFilter::all(), &ctx)
            .unwrap();
    table.settings().set_auto_refresh_rate(30);
    table.unmount().await;

    let table =
        ResourceTable::mount(api, ResourceKind::DockerConfig, ListFilter::all(), &ctx).unwrap();
    assert_eq!(table.settings().settings().auto_refresh_rate, 30);
}
