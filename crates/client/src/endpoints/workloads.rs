//! Auxiliary reads used to decorate list rows: namespaces and workloads.

use reqwest::Client;

use crate::endpoints::request::{API_KEY_HEADER, read_json, send_request_with_retry};
use crate::error::Result;
use crate::models::{EnvironmentId, Namespace, Workload};

/// List the namespaces of a Kubernetes environment.
pub async fn list_namespaces(
    client: &Client,
    base_url: &str,
    api_key: &str,
    env: EnvironmentId,
    max_retries: usize,
) -> Result<Vec<Namespace>> {
    let url = format!("{base_url}/api/kubernetes/{env}/namespaces");
    let builder = client.get(&url).header(API_KEY_HEADER, api_key);
    let response = send_request_with_retry(builder, max_retries).await?;
    read_json(response).await
}

/// List the workloads of a Kubernetes environment with their mounted
/// secrets and ConfigMaps.
pub async fn list_workloads(
    client: &Client,
    base_url: &str,
    api_key: &str,
    env: EnvironmentId,
    max_retries: usize,
) -> Result<Vec<Workload>> {
    let url = format!("{base_url}/api/kubernetes/{env}/applications");
    let builder = client.get(&url).header(API_KEY_HEADER, api_key);
    let response = send_request_with_retry(builder, max_retries).await?;
    read_json(response).await
}
