//! Clinical resource access
//!
//! Resources are plain `serde_json::Value` documents. The `Repository` trait is the
//! read/search seam shared by the terminology, retrieve and library crates.

pub mod bundle;
pub mod error;
pub mod memory;
pub mod search;

pub use bundle::{bundle_resources, resource_id, resource_type, resources_of_type};
pub use error::RepositoryError;
pub use memory::InMemoryRepository;
pub use search::SearchParams;

use std::sync::Arc;

/// A clinical resource in its JSON form
pub type Resource = serde_json::Value;

/// Read and search access to a store of resources
pub trait Repository: Send + Sync {
    /// Read a resource by type and id. A missing resource is `Ok(None)`.
    fn read(&self, resource_type: &str, id: &str) -> Result<Option<Resource>, RepositoryError>;

    /// All resources of `resource_type` matching `params`, in store order
    fn search(&self, resource_type: &str, params: &SearchParams) -> Result<Vec<Resource>, RepositoryError>;
}

impl<R: Repository + ?Sized> Repository for Arc<R> {
    fn read(&self, resource_type: &str, id: &str) -> Result<Option<Resource>, RepositoryError> {
        (**self).read(resource_type, id)
    }

    fn search(&self, resource_type: &str, params: &SearchParams) -> Result<Vec<Resource>, RepositoryError> {
        (**self).search(resource_type, params)
    }
}
