//! Two-tier model cache
//!
//! `GlobalModelCache` is process-wide and keyed by the full versioned identifier.
//! `ModelManager` is one resolution session: it keeps a local map keyed by the bare
//! model id, which is what enforces the one-version-per-model rule.

use crate::error::ModelError;
use crate::identifier::VersionedIdentifier;
use crate::loader::ModelInfoLoader;
use crate::model_info::ModelInfo;
use dashmap::DashMap;
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// A loaded data model
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    pub identifier: VersionedIdentifier,
    pub info: ModelInfo,
}

impl ModelDescriptor {
    pub fn new(identifier: VersionedIdentifier, info: ModelInfo) -> Self {
        Self { identifier, info }
    }

    pub fn version(&self) -> Option<&str> {
        self.identifier.version()
    }
}

static SHARED_MODEL_CACHE: Lazy<Arc<GlobalModelCache>> =
    Lazy::new(|| Arc::new(GlobalModelCache::new()));

/// Process-wide model descriptor cache. Entries are never evicted.
#[derive(Debug, Default)]
pub struct GlobalModelCache {
    entries: DashMap<VersionedIdentifier, Arc<ModelDescriptor>>,
}

impl GlobalModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance shared by every session in this process
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED_MODEL_CACHE)
    }

    pub fn get(&self, identifier: &VersionedIdentifier) -> Option<Arc<ModelDescriptor>> {
        self.entries.get(identifier).map(|entry| Arc::clone(entry.value()))
    }

    /// Store `descriptor` unless another thread got there first, returning whichever is stored
    pub fn insert_if_absent(
        &self,
        identifier: VersionedIdentifier,
        descriptor: Arc<ModelDescriptor>,
    ) -> Arc<ModelDescriptor> {
        Arc::clone(self.entries.entry(identifier).or_insert(descriptor).value())
    }

    pub fn contains(&self, identifier: &VersionedIdentifier) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// One model resolution session.
///
/// Not meant to be shared between concurrent evaluations; create one per compilation.
pub struct ModelManager {
    loader: Arc<dyn ModelInfoLoader>,
    global: Arc<GlobalModelCache>,
    local: HashMap<String, Arc<ModelDescriptor>>,
}

impl ModelManager {
    /// Session backed by the process-wide cache
    pub fn new(loader: Arc<dyn ModelInfoLoader>) -> Self {
        Self::with_global_cache(loader, GlobalModelCache::shared())
    }

    pub fn with_global_cache(loader: Arc<dyn ModelInfoLoader>, global: Arc<GlobalModelCache>) -> Self {
        Self {
            loader,
            global,
            local: HashMap::new(),
        }
    }

    /// Resolve a model, loading it (and the models it requires) on first use.
    ///
    /// Fails with `ModelError::VersionConflict` when a different version of the same
    /// model id was already resolved in this session.
    pub fn resolve(&mut self, identifier: &VersionedIdentifier) -> Result<Arc<ModelDescriptor>, ModelError> {
        if let Some(cached) = self.local.get(&identifier.id) {
            if let Some(requested) = identifier.version() {
                if cached.version() != Some(requested) {
                    return Err(ModelError::VersionConflict {
                        id: identifier.id.clone(),
                        loaded: cached.version().unwrap_or("<unversioned>").to_string(),
                        requested: requested.to_string(),
                    });
                }
            }
            return Ok(Arc::clone(cached));
        }

        let descriptor = match self.global.get(identifier) {
            Some(descriptor) => {
                debug!("Model {} found in global cache", identifier);
                descriptor
            }
            None => self.load(identifier)?,
        };

        // registered before dependencies so that mutually requiring models terminate
        self.local
            .insert(identifier.id.clone(), Arc::clone(&descriptor));

        for required in &descriptor.info.required_models {
            self.resolve(required)?;
        }

        Ok(descriptor)
    }

    fn load(&self, identifier: &VersionedIdentifier) -> Result<Arc<ModelDescriptor>, ModelError> {
        debug!("Loading model {}", identifier);
        let info = self.loader.load(identifier)?;

        let concrete = VersionedIdentifier {
            id: identifier.id.clone(),
            version: info.version.clone().or_else(|| identifier.version.clone()),
        };
        let descriptor = Arc::new(ModelDescriptor::new(concrete.clone(), info));
        let stored = self.global.insert_if_absent(identifier.clone(), descriptor);

        // a "latest" request is also reachable under the version it turned out to be
        if concrete != *identifier {
            self.global.insert_if_absent(concrete, Arc::clone(&stored));
        }
        Ok(stored)
    }

    /// The descriptor resolved in this session for model `id`, if any
    pub fn resolved(&self, id: &str) -> Option<Arc<ModelDescriptor>> {
        self.local.get(id).cloned()
    }

    pub fn resolved_models(&self) -> impl Iterator<Item = &VersionedIdentifier> {
        self.local.values().map(|d| &d.identifier)
    }
}
