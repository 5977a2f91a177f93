//! Mock collaborators
//!
//! Each mock records how often it was called so tests can check which
//! collaborators a cache or chain actually consulted.

use octofhir_cqf::library::{LibraryError, LibraryIdentityLookup, ResourceId};
use octofhir_cqf::model::{InMemoryModelInfoLoader, ModelError, ModelInfo, ModelInfoLoader};
use octofhir_cqf::retrieve::RetrieveError;
use octofhir_cqf::{Resource, RetrieveProvider, RetrieveRequest, VersionedIdentifier};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Model info loader over in-memory models that counts `load` calls
pub struct CountingModelLoader {
    inner: InMemoryModelInfoLoader,
    loads: AtomicUsize,
}

impl CountingModelLoader {
    pub fn new(models: impl IntoIterator<Item = ModelInfo>) -> Self {
        Self {
            inner: InMemoryModelInfoLoader::with_models(models),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelInfoLoader for CountingModelLoader {
    fn load(&self, identifier: &VersionedIdentifier) -> Result<ModelInfo, ModelError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(identifier)
    }
}

/// Retrieve provider answering every request with the same result
pub struct MockRetrieveProvider {
    result: Option<Vec<Resource>>,
    calls: AtomicUsize,
}

impl MockRetrieveProvider {
    pub fn returning(resources: Vec<Resource>) -> Self {
        Self {
            result: Some(resources),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    /// A misbehaving provider that answers "unknown" instead of an empty list
    pub fn unknown() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RetrieveProvider for MockRetrieveProvider {
    fn retrieve(&self, _request: &RetrieveRequest) -> Result<Option<Vec<Resource>>, RetrieveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

/// Identity lookup backed by a fixed table; unknown ids resolve to nothing
#[derive(Default)]
pub struct MockIdentityLookup {
    identities: RwLock<HashMap<ResourceId, VersionedIdentifier>>,
    calls: AtomicUsize,
}

impl MockIdentityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(self, id: ResourceId, identifier: VersionedIdentifier) -> Self {
        self.identities.write().insert(id, identifier);
        self
    }

    pub fn forget(&self, id: &ResourceId) {
        self.identities.write().remove(id);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LibraryIdentityLookup for MockIdentityLookup {
    fn identify(&self, id: &ResourceId) -> Result<Option<VersionedIdentifier>, LibraryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.identities.read().get(id).cloned())
    }
}
