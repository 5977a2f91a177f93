//! Priority fallback chain
//!
//! Providers are asked in registration order with identical arguments. The first
//! non-empty answer wins and later providers are not consulted. This is not a merge.

use crate::error::RetrieveError;
use crate::provider::RetrieveProvider;
use crate::request::RetrieveRequest;
use log::debug;
use octofhir_cqf_repository::Resource;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
pub struct PriorityRetrieveProvider {
    providers: RwLock<Vec<Arc<dyn RetrieveProvider>>>,
}

impl PriorityRetrieveProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_providers(providers: impl IntoIterator<Item = Arc<dyn RetrieveProvider>>) -> Self {
        let chain = Self::new();
        for provider in providers {
            chain.register(provider);
        }
        chain
    }

    /// Append `provider` to the chain. Returns `false` if this same instance is
    /// already registered.
    pub fn register(&self, provider: Arc<dyn RetrieveProvider>) -> bool {
        let mut providers = self.providers.write();
        if providers.iter().any(|existing| same_instance(existing, &provider)) {
            return false;
        }
        providers.push(provider);
        true
    }

    pub fn len(&self) -> usize {
        self.providers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.read().is_empty()
    }
}

fn same_instance(a: &Arc<dyn RetrieveProvider>, b: &Arc<dyn RetrieveProvider>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl RetrieveProvider for PriorityRetrieveProvider {
    fn retrieve(&self, request: &RetrieveRequest) -> Result<Option<Vec<Resource>>, RetrieveError> {
        // providers may block on I/O; do not hold the registration lock while they run
        let providers = self.providers.read().clone();

        for (position, provider) in providers.iter().enumerate() {
            match provider.retrieve(request)? {
                None => {
                    return Err(RetrieveError::ContractViolation {
                        position,
                        data_type: request.data_type.clone(),
                    });
                }
                Some(resources) if resources.is_empty() => {
                    debug!("Provider {position} has no {} data, trying the next", request.data_type);
                }
                Some(resources) => {
                    debug!(
                        "Provider {position} answered {} with {} resources",
                        request.data_type,
                        resources.len()
                    );
                    return Ok(Some(resources));
                }
            }
        }

        Ok(Some(Vec::new()))
    }
}
