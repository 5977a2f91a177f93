//! The retrieve provider seam

use crate::error::RetrieveError;
use crate::request::RetrieveRequest;
use octofhir_cqf_repository::Resource;

/// One source of data for Retrieve expressions.
///
/// `Ok(Some(vec![]))` means "no data here". `Ok(None)` is the legacy "unknown" answer;
/// chains treat it as a defect in the provider.
pub trait RetrieveProvider: Send + Sync {
    fn retrieve(&self, request: &RetrieveRequest) -> Result<Option<Vec<Resource>>, RetrieveError>;
}

/// Provider with no data
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRetrieveProvider;

impl NoOpRetrieveProvider {
    pub fn new() -> Self {
        Self
    }
}

impl RetrieveProvider for NoOpRetrieveProvider {
    fn retrieve(&self, _request: &RetrieveRequest) -> Result<Option<Vec<Resource>>, RetrieveError> {
        Ok(Some(Vec::new()))
    }
}
