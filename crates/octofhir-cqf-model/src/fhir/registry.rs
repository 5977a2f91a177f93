//! Registration table from FHIR version to model resolver factory

use super::FhirVersion;
use crate::error::ModelError;
use crate::resolver::{FhirModelResolver, ModelResolver};
use std::collections::HashMap;
use std::sync::Arc;

pub type ModelResolverFactory = Arc<dyn Fn() -> Arc<dyn ModelResolver> + Send + Sync>;

/// Maps each supported FHIR version to the factory producing its resolver
#[derive(Clone, Default)]
pub struct ModelResolverRegistry {
    factories: HashMap<FhirVersion, ModelResolverFactory>,
}

impl ModelResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the JSON resolver registered for every known version
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for version in FhirVersion::ALL {
            registry.register(version, move || {
                Arc::new(FhirModelResolver::new(version)) as Arc<dyn ModelResolver>
            });
        }
        registry
    }

    /// Register (or replace) the factory for `version`
    pub fn register<F>(&mut self, version: FhirVersion, factory: F)
    where
        F: Fn() -> Arc<dyn ModelResolver> + Send + Sync + 'static,
    {
        self.factories.insert(version, Arc::new(factory));
    }

    pub fn create(&self, version: FhirVersion) -> Result<Arc<dyn ModelResolver>, ModelError> {
        self.factories
            .get(&version)
            .map(|factory| factory())
            .ok_or_else(|| ModelError::UnsupportedFhirVersion(version.to_string()))
    }

    /// Parse a version string and create its resolver
    pub fn create_for(&self, version: &str) -> Result<Arc<dyn ModelResolver>, ModelError> {
        self.create(version.parse()?)
    }

    pub fn supports(&self, version: FhirVersion) -> bool {
        self.factories.contains_key(&version)
    }
}
