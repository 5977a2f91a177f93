//! Shared test utilities
//!
//! - mock loaders and providers that count their calls
//! - small resource builders

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use octofhir_cqf::Resource;
use serde_json::json;

pub fn patient(id: &str) -> Resource {
    json!({ "resourceType": "Patient", "id": id })
}

pub fn patients(ids: &[&str]) -> Vec<Resource> {
    ids.iter().map(|id| patient(id)).collect()
}

pub fn ids(resources: &[Resource]) -> Vec<&str> {
    resources
        .iter()
        .filter_map(|resource| resource.get("id").and_then(|id| id.as_str()))
        .collect()
}

pub fn library(id: &str, name: &str, version: &str) -> Resource {
    json!({
        "resourceType": "Library",
        "id": id,
        "name": name,
        "version": version,
        "url": format!("http://example.org/Library/{name}")
    })
}
