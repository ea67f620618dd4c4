//! Rate limit (429) retry behavior tests.
//!
//! # Invariants
//! - 429 responses trigger retry with exponential backoff (1s, 2s, ...)
//! - Other error statuses are not retried

mod common;

use common::*;
use fleetdeck_client::ClientError;
use std::time::Duration;
use wiremock::matchers::{method, path};

#[tokio::test(start_paused = true)]
async fn test_retry_on_429_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/kubernetes/1/secrets"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/kubernetes/1/secrets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": "db-creds", "namespace": "default"}
        ])))
        .mount(&mock_server)
        .await;

    let client = Client::new();
    let server_uri = mock_server.uri();
    let result_handle = tokio::spawn(async move {
        let builder = client
            .get(format!("{server_uri}/api/kubernetes/1/secrets"))
            .header(endpoints::API_KEY_HEADER, TEST_KEY);
        endpoints::send_request_with_retry(builder, 3).await
    });

    assert_pending(&result_handle, "429 retry should wait for backoff").await;
    advance_and_yield(Duration::from_secs(1)).await;
    assert_pending(&result_handle, "second 429 retry should wait for backoff").await;
    advance_and_yield(Duration::from_secs(2)).await;
    let response = result_handle.await.expect("list task").unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test(start_paused = true)]
async fn test_retry_on_429_exhaustion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/endpoints/1/docker/secrets/s1"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = Client::new();
    let server_uri = mock_server.uri();
    let result_handle = tokio::spawn(async move {
        let builder = client.delete(format!("{server_uri}/api/endpoints/1/docker/secrets/s1"));
        endpoints::send_request_with_retry(builder, 2).await
    });

    assert_pending(&result_handle, "429 exhaustion should wait for backoff").await;
    advance_and_yield(Duration::from_secs(1)).await;
    assert_pending(&result_handle, "429 exhaustion should wait for second backoff").await;
    advance_and_yield(Duration::from_secs(2)).await;
    let result = result_handle.await.expect("delete task");

    // 2 retries + 1 initial attempt = 3 total
    assert!(matches!(result, Err(ClientError::MaxRetriesExceeded(3))));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/endpoints"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::new();
    let builder = client.get(format!("{}/api/endpoints", mock_server.uri()));
    let err = endpoints::send_request_with_retry(builder, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ApiError { status: 503, .. }));
    assert!(err.is_retryable());
}
