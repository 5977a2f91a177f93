//! Change-driven invalidation of compiled libraries
//!
//! A host forwards resource change notifications as `ResourceChangeEvent`s. Each
//! changed or deleted Library id is mapped back to its name and version and the
//! matching cache entries are dropped. When an id can no longer be mapped (the
//! resource is already gone, or the lookup fails) there is no way to tell which
//! entry it backed, so the whole cache is cleared.

use crate::cache::CompiledLibraryCache;
use crate::error::LibraryError;
use crate::selector::VersionedArtifact;
use log::{debug, warn};
use octofhir_cqf_model::VersionedIdentifier;
use octofhir_cqf_repository::Repository;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque storage identity of a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub resource_type: String,
    pub id: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Parse `Type/id`, ignoring any `/_history/..` suffix
    pub fn parse(reference: &str) -> Option<Self> {
        let reference = reference
            .find("/_history/")
            .map_or(reference, |at| &reference[..at]);
        let (resource_type, id) = reference.split_once('/')?;
        (!resource_type.is_empty() && !id.is_empty() && !id.contains('/'))
            .then(|| Self::new(resource_type, id))
    }

    pub fn is_library(&self) -> bool {
        self.resource_type == "Library"
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// One batch of change notifications. Delivery is at-least-once and unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChangeEvent {
    #[serde(default)]
    pub deleted_ids: Vec<ResourceId>,
    #[serde(default)]
    pub updated_ids: Vec<ResourceId>,
}

impl ResourceChangeEvent {
    pub fn deleted(ids: impl IntoIterator<Item = ResourceId>) -> Self {
        Self {
            deleted_ids: ids.into_iter().collect(),
            updated_ids: Vec::new(),
        }
    }

    pub fn updated(ids: impl IntoIterator<Item = ResourceId>) -> Self {
        Self {
            deleted_ids: Vec::new(),
            updated_ids: ids.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.deleted_ids.iter().chain(&self.updated_ids)
    }

    pub fn is_empty(&self) -> bool {
        self.deleted_ids.is_empty() && self.updated_ids.is_empty()
    }
}

/// Maps a storage id back to the library name and version it holds
pub trait LibraryIdentityLookup: Send + Sync {
    /// `Ok(None)` when the resource no longer exists or carries no name
    fn identify(&self, id: &ResourceId) -> Result<Option<VersionedIdentifier>, LibraryError>;
}

/// Reads the Library from a repository and takes its `name` and `version`
pub struct RepositoryLibraryIdentityLookup {
    repository: Arc<dyn Repository>,
}

impl RepositoryLibraryIdentityLookup {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }
}

impl LibraryIdentityLookup for RepositoryLibraryIdentityLookup {
    fn identify(&self, id: &ResourceId) -> Result<Option<VersionedIdentifier>, LibraryError> {
        let Some(library) = self.repository.read(&id.resource_type, &id.id)? else {
            return Ok(None);
        };
        Ok(library.name().map(|name| match library.version() {
            Some(version) => VersionedIdentifier::with_version(name, version),
            None => VersionedIdentifier::new(name),
        }))
    }
}

/// What a change event did to the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationOutcome {
    /// No cached entry was affected
    Unchanged,
    /// Exactly these entries were dropped
    Removed(Vec<VersionedIdentifier>),
    /// An id could not be mapped back, every entry was dropped
    Cleared,
}

pub struct LibraryCacheInvalidator<T> {
    cache: Arc<CompiledLibraryCache<T>>,
    lookup: Arc<dyn LibraryIdentityLookup>,
}

impl<T> LibraryCacheInvalidator<T> {
    pub fn new(cache: Arc<CompiledLibraryCache<T>>, lookup: Arc<dyn LibraryIdentityLookup>) -> Self {
        Self { cache, lookup }
    }

    pub fn cache(&self) -> &Arc<CompiledLibraryCache<T>> {
        &self.cache
    }

    /// Apply one change event. Ids of other resource types are ignored.
    ///
    /// Besides the exact `name|version` entry, the versionless entry of the same
    /// library is dropped too, since "latest" may now resolve differently.
    pub fn handle(&self, event: &ResourceChangeEvent) -> InvalidationOutcome {
        let mut removed = Vec::new();

        for id in event.ids() {
            if !id.is_library() {
                debug!("Ignoring change to {id}");
                continue;
            }

            let key = match self.lookup.identify(id) {
                Ok(Some(key)) => key,
                Ok(None) => {
                    warn!("Unable to map {id} to a library name and version, clearing compiled library cache");
                    self.cache.clear();
                    return InvalidationOutcome::Cleared;
                }
                Err(err) => {
                    warn!("Lookup of {id} failed ({err}), clearing compiled library cache");
                    self.cache.clear();
                    return InvalidationOutcome::Cleared;
                }
            };

            let unversioned = key.unversioned();
            for stale in [key, unversioned] {
                if self.cache.remove(&stale).is_some() {
                    debug!("Invalidated compiled library {stale} after change to {id}");
                    removed.push(stale);
                }
            }
        }

        if removed.is_empty() {
            InvalidationOutcome::Unchanged
        } else {
            InvalidationOutcome::Removed(removed)
        }
    }
}
