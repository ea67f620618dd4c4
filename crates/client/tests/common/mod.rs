//! Common test utilities for integration tests.
//!
//! # What this does NOT handle
//! - Mock server setup (use wiremock directly in tests)

use std::time::Duration;

#[allow(unused_imports)]
pub use fleetdeck_client::{FleetClient, endpoints};
#[allow(unused_imports)]
pub use reqwest::Client;
#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "ptr_test-key";

/// A client pointed at `server` for environment 1.
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> FleetClient {
    FleetClient::builder()
        .base_url(server.uri())
        .api_key(secrecy::SecretString::new(TEST_KEY.to_string().into()))
        .environment_id(1)
        .max_retries(1)
        .build()
        .expect("client builds")
}

/// Advance Tokio's paused clock and yield so sleepers can observe the change.
#[allow(dead_code)]
pub async fn advance_and_yield(duration: Duration) {
    tokio::time::advance(duration).await;
    tokio::task::yield_now().await;
}

/// Assert that a task has not completed after yielding to the scheduler.
#[allow(dead_code)]
pub async fn assert_pending<T>(handle: &tokio::task::JoinHandle<T>, context: &str) {
    tokio::task::yield_now().await;
    assert!(!handle.is_finished(), "Expected pending task: {}", context);
}
