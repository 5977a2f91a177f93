//! Retrieve through a repository search

use crate::error::RetrieveError;
use crate::filter::ResourceFilter;
use crate::provider::RetrieveProvider;
use crate::request::RetrieveRequest;
use crate::settings::RetrieveSettings;
use log::debug;
use octofhir_cqf_model::ModelResolver;
use octofhir_cqf_repository::{Repository, Resource, SearchParams};
use octofhir_cqf_terminology::TerminologyProvider;
use std::sync::Arc;

/// Searches the repository by type and applies the remaining criteria in memory
pub struct RepositoryRetrieveProvider {
    repository: Arc<dyn Repository>,
    filter: ResourceFilter,
}

impl RepositoryRetrieveProvider {
    pub fn new(repository: Arc<dyn Repository>, resolver: Arc<dyn ModelResolver>) -> Self {
        Self {
            repository,
            filter: ResourceFilter::new(resolver),
        }
    }

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

    fn search_params(request: &RetrieveRequest) -> SearchParams {
        let params = SearchParams::new();
        match (request.context.as_deref(), request.context_value.as_deref()) {
            (Some(context), Some(id)) if context == request.data_type => params.with_param("_id", id),
            _ => params,
        }
    }
}

impl RetrieveProvider for RepositoryRetrieveProvider {
    fn retrieve(&self, request: &RetrieveRequest) -> Result<Option<Vec<Resource>>, RetrieveError> {
        let params = Self::search_params(request);
        let found = self.repository.search(&request.data_type, &params)?;
        debug!("Repository search for {} returned {} candidates", request.data_type, found.len());
        Ok(Some(self.filter.apply(request, &found)?))
    }
}
