//! REST API endpoint implementations.

mod request;
mod resources;
pub mod url_encoding;
mod workloads;

pub use request::{API_KEY_HEADER, send_request_with_retry};
pub use resources::{delete_resources, list_resources};
pub use workloads::{list_namespaces, list_workloads};
