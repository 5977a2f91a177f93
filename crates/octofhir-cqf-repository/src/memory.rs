//! In-memory repository

use crate::bundle::{bundle_resources, resource_id, resource_type};
use crate::error::RepositoryError;
use crate::search::SearchParams;
use crate::{Repository, Resource};
use dashmap::DashMap;
use indexmap::IndexMap;
use log::debug;

/// Repository over resources held in memory, grouped by resource type.
///
/// Search results come back in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    resources: DashMap<String, IndexMap<String, Resource>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Result<Self, RepositoryError> {
        let repository = Self::new();
        for resource in resources {
            repository.put(resource)?;
        }
        Ok(repository)
    }

    pub fn from_bundle(bundle: &Resource) -> Result<Self, RepositoryError> {
        Self::from_resources(bundle_resources(bundle)?)
    }

    /// Insert or replace a resource. It must carry `resourceType` and `id`.
    pub fn put(&self, resource: Resource) -> Result<(), RepositoryError> {
        let kind = resource_type(&resource)
            .ok_or_else(|| RepositoryError::invalid_resource("Missing resourceType field"))?
            .to_string();
        let id = resource_id(&resource)
            .ok_or_else(|| RepositoryError::invalid_resource(format!("{kind} without an id")))?
            .to_string();

        debug!("Storing {kind}/{id}");
        self.resources.entry(kind).or_default().insert(id, resource);
        Ok(())
    }

    pub fn remove(&self, resource_type: &str, id: &str) -> Option<Resource> {
        self.resources
            .get_mut(resource_type)
            .and_then(|mut of_type| of_type.shift_remove(id))
    }

    pub fn len(&self) -> usize {
        self.resources.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Repository for InMemoryRepository {
    fn read(&self, resource_type: &str, id: &str) -> Result<Option<Resource>, RepositoryError> {
        Ok(self
            .resources
            .get(resource_type)
            .and_then(|of_type| of_type.get(id).cloned()))
    }

    fn search(&self, resource_type: &str, params: &SearchParams) -> Result<Vec<Resource>, RepositoryError> {
        let Some(of_type) = self.resources.get(resource_type) else {
            return Ok(Vec::new());
        };
        let matching = of_type.values().filter(|resource| params.matches(resource)).cloned();
        Ok(match params.count {
            Some(count) => matching.take(count).collect(),
            None => matching.collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn library(id: &str, name: &str, version: &str) -> Resource {
        json!({"resourceType": "Library", "id": id, "name": name, "version": version})
    }

    #[test]
    fn test_put_read_remove() {
        let repo = InMemoryRepository::new();
        repo.put(library("a", "Common", "1.0.0")).unwrap();

        assert_eq!(repo.read("Library", "a").unwrap(), Some(library("a", "Common", "1.0.0")));
        assert_eq!(repo.read("Library", "b").unwrap(), None);
        assert_eq!(repo.read("Patient", "a").unwrap(), None);

        assert!(repo.remove("Library", "a").is_some());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_search_preserves_insertion_order() {
        let repo = InMemoryRepository::from_resources([
            library("b", "Common", "2.0.0"),
            library("a", "Common", "1.0.0"),
            library("c", "Other", "1.0.0"),
        ])
        .unwrap();

        let found = repo
            .search("Library", &SearchParams::new().with_param("name", "Common"))
            .unwrap();
        let ids: Vec<_> = found.iter().filter_map(resource_id).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let first = repo.search("Library", &SearchParams::new().with_count(1)).unwrap();
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_resource_without_id_is_rejected() {
        let repo = InMemoryRepository::new();
        let err = repo.put(json!({"resourceType": "Patient"})).unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidResource { .. }));
    }

    #[test]
    fn test_from_bundle() {
        let bundle = json!({
            "resourceType": "Bundle",
            "entry": [
                {"resource": {"resourceType": "Patient", "id": "p1"}},
                {"resource": {"resourceType": "Patient", "id": "p2"}}
            ]
        });
        let repo = InMemoryRepository::from_bundle(&bundle).unwrap();
        assert_eq!(repo.len(), 2);
    }
}
