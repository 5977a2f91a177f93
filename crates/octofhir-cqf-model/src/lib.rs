//! CQF data model resolution
//!
//! This crate provides:
//! - `VersionedIdentifier` and dotted version ordering
//! - ModelInfo types and XML/JSON parsing
//! - Model info loaders (in-memory and directory backed)
//! - The two-tier model cache (`GlobalModelCache` + per-session `ModelManager`)
//! - Model alias expansion (`FHIR`, `QUICK`, `QDM`)
//! - FHIR version registration table and JSON path resolution

pub mod alias;
pub mod cache;
pub mod error;
pub mod fhir;
pub mod identifier;
pub mod loader;
pub mod model_info;
pub mod resolver;
pub mod version;

pub use alias::{expand_alias, model_uri, FHIR_MODEL_URI, QDM_MODEL_URI};
pub use cache::{GlobalModelCache, ModelDescriptor, ModelManager};
pub use error::ModelError;
pub use fhir::{FhirVersion, ModelResolverFactory, ModelResolverRegistry};
pub use identifier::VersionedIdentifier;
pub use loader::{DirectoryModelInfoLoader, InMemoryModelInfoLoader, ModelInfoLoader};
pub use model_info::*;
pub use resolver::{FhirModelResolver, ModelResolver, PathError};
pub use version::{compare_versions, is_newer, Version, VersionError};
