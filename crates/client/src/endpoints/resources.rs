//! List and delete endpoints for every [`ResourceKind`].
//!
//! # What this module handles:
//! - Building collection URLs and delete payloads per kind
//! - One HTTP round trip per list, one or more per delete
//!
//! # What this module does NOT handle:
//! - Partitioning a selection into batches (the caller decides what one
//!   delete call covers)
//! - Retrying anything other than HTTP 429 (see [`send_request_with_retry`])
//!
//! # Invariants
//! - A delete call either succeeds for every target it names or returns the
//!   first error; per-key kinds stop at the first failing key.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::endpoints::request::{API_KEY_HEADER, read_json, send_request_with_retry};
use crate::endpoints::url_encoding::encode_path_segment;
use crate::error::{ClientError, Result};
use crate::models::{DeleteStyle, EnvironmentId, ListFilter, Resource, ResourceKind};

#[derive(Serialize)]
struct NamespacedName<'a> {
    namespace: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct EnvironmentRef {
    id: u64,
}

#[derive(Serialize)]
struct EnvironmentDeleteBody {
    endpoints: Vec<EnvironmentRef>,
}

/// List every resource of `kind` in environment `env`.
///
/// For namespaced kinds a non-empty `filter` is sent as a comma separated
/// `namespaces` query parameter.
pub async fn list_resources(
    client: &Client,
    base_url: &str,
    api_key: &str,
    env: EnvironmentId,
    kind: ResourceKind,
    filter: &ListFilter,
    max_retries: usize,
) -> Result<Vec<Resource>> {
    let url = format!("{}{}", base_url, kind.collection_path(env));

    let mut builder = client.get(&url).header(API_KEY_HEADER, api_key);
    if kind.is_namespaced() && !filter.namespaces.is_empty() {
        builder = builder.query(&[("namespaces", filter.namespaces.join(","))]);
    }

    let response = send_request_with_retry(builder, max_retries).await?;
    let resources: Vec<Resource> = read_json(response).await?;
    debug!(kind = %kind, count = resources.len(), "Listed resources");
    Ok(resources)
}

/// Delete `targets`, all of the same `kind`, in environment `env`.
///
/// An empty target list is a no-op and sends nothing.
pub async fn delete_resources(
    client: &Client,
    base_url: &str,
    api_key: &str,
    env: EnvironmentId,
    kind: ResourceKind,
    targets: &[Resource],
    max_retries: usize,
) -> Result<()> {
    if targets.is_empty() {
        return Ok(());
    }

    let collection = format!("{}{}", base_url, kind.collection_path(env));
    match kind.delete_style() {
        DeleteStyle::BatchKeys => {
            let body = targets
                .iter()
                .map(|r| -> Result<NamespacedName<'_>> {
                    Ok(NamespacedName {
                        namespace: require_namespace(r)?,
                        name: &r.name,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            post_json(client, &format!("{collection}/delete"), api_key, &body, max_retries).await
        }
        DeleteStyle::GroupedByNamespace => {
            let mut body: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
            for r in targets {
                body.entry(require_namespace(r)?).or_default().push(&r.name);
            }
            post_json(client, &format!("{collection}/delete"), api_key, &body, max_retries).await
        }
        DeleteStyle::PerKey => {
            for r in targets {
                let url = format!("{collection}/{}", encode_path_segment(&r.id));
                let builder = client.delete(&url).header(API_KEY_HEADER, api_key);
                send_request_with_retry(builder, max_retries).await?;
                debug!(kind = %kind, id = %r.id, "Deleted resource");
            }
            Ok(())
        }
        DeleteStyle::EnvironmentIds => {
            let endpoints = targets
                .iter()
                .map(|r| {
                    r.id.parse::<u64>().map(|id| EnvironmentRef { id }).map_err(|_| {
                        ClientError::InvalidRequest(format!(
                            "environment '{}' has non-numeric id '{}'",
                            r.name, r.id
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            post_json(
                client,
                &format!("{collection}/delete"),
                api_key,
                &EnvironmentDeleteBody { endpoints },
                max_retries,
            )
            .await
        }
    }
}

fn require_namespace(resource: &Resource) -> Result<&str> {
    resource.namespace.as_deref().ok_or_else(|| {
        ClientError::InvalidRequest(format!("'{}' has no namespace", resource.name))
    })
}

async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    api_key: &str,
    body: &B,
    max_retries: usize,
) -> Result<()> {
    let builder = client.post(url).header(API_KEY_HEADER, api_key).json(body);
    send_request_with_retry(builder, max_retries).await?;
    Ok(())
}
