//! Retrieve over the resources of a bundle

use crate::error::RetrieveError;
use crate::filter::ResourceFilter;
use crate::provider::RetrieveProvider;
use crate::request::RetrieveRequest;
use crate::settings::RetrieveSettings;
use octofhir_cqf_model::ModelResolver;
use octofhir_cqf_repository::{bundle_resources, resources_of_type, Resource};
use octofhir_cqf_terminology::TerminologyProvider;
use std::sync::Arc;

pub struct BundleRetrieveProvider {
    resources: Vec<Resource>,
    filter: ResourceFilter,
}

impl BundleRetrieveProvider {
    pub fn new(resources: Vec<Resource>, resolver: Arc<dyn ModelResolver>) -> Self {
        Self {
            resources,
            filter: ResourceFilter::new(resolver),
        }
    }

    pub fn from_bundle(bundle: &Resource, resolver: Arc<dyn ModelResolver>) -> Result<Self, RetrieveError> {
        Ok(Self::new(bundle_resources(bundle)?, resolver))
    }

    /// Needed for value set criteria; without it such retrieves fail
    #[must_use]
    pub fn with_terminology(mut self, terminology: Arc<dyn TerminologyProvider>) -> Self {
        self.filter = self.filter.with_terminology(terminology);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RetrieveSettings) -> Self {
        self.filter = self.filter.with_settings(settings);
        self
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl RetrieveProvider for BundleRetrieveProvider {
    fn retrieve(&self, request: &RetrieveRequest) -> Result<Option<Vec<Resource>>, RetrieveError> {
        let candidates = resources_of_type(&self.resources, &request.data_type);
        Ok(Some(self.filter.apply(request, candidates)?))
    }
}
