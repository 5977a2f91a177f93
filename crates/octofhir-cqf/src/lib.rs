//! Data, model, terminology and library resolution for CQL evaluation over FHIR
//!
//! This crate ties the workspace together:
//! - model resolution with a per-session version check over a process-wide cache
//! - retrieve providers and the priority fallback chain
//! - value set indexing and membership
//! - compiled library caching with change-driven invalidation
//! - endpoint classification and provider factories
//!
//! # Example
//!
//! ```ignore
//! use octofhir_cqf::{BundleRetrieveProvider, FhirModelResolver, FhirVersion, RetrieveRequest};
//!
//! let provider = BundleRetrieveProvider::from_bundle(&bundle, Arc::new(FhirModelResolver::new(FhirVersion::R4)))?;
//! let conditions = provider.retrieve(
//!     &RetrieveRequest::new("Condition").with_context("Patient", Some("subject"), "example"),
//! )?;
//! ```

pub use octofhir_cqf_diagnostics as diagnostics;
pub use octofhir_cqf_library as library;
pub use octofhir_cqf_model as model;
pub use octofhir_cqf_repository as repository;
pub use octofhir_cqf_retrieve as retrieve;
pub use octofhir_cqf_terminology as terminology;

pub mod config;
pub mod endpoint;
pub mod error;

pub use config::{CqfSettings, ModelSettings};
pub use endpoint::{classify, EndpointError, EndpointInfo, EndpointType, ProviderFactoryRegistry};
pub use error::{CqfError, Result};

// Convenience re-exports
pub use octofhir_cqf_diagnostics::{Diagnostic, ErrorCode, StatusClass};
pub use octofhir_cqf_library::{CompiledLibraryCache, LibraryCacheInvalidator, LibraryVersionSelector};
pub use octofhir_cqf_model::{
    FhirModelResolver, FhirVersion, GlobalModelCache, ModelManager, ModelResolver, VersionedIdentifier,
};
pub use octofhir_cqf_repository::{InMemoryRepository, Repository, Resource};
pub use octofhir_cqf_retrieve::{
    BundleRetrieveProvider, PriorityRetrieveProvider, RetrieveProvider, RetrieveRequest,
};
pub use octofhir_cqf_terminology::{
    BundleTerminologyProvider, Code, TerminologyProvider, ValueSetInfo,
};
