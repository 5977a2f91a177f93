//! Top-level error
//!
//! Wraps the error of every crate in the workspace so a host can map any failure
//! to a status class with one call.

use crate::endpoint::EndpointError;
use octofhir_cqf_diagnostics::{ErrorCode, StatusClass};
use octofhir_cqf_library::LibraryError;
use octofhir_cqf_model::{ModelError, PathError, VersionError};
use octofhir_cqf_repository::RepositoryError;
use octofhir_cqf_retrieve::RetrieveError;
use octofhir_cqf_terminology::TerminologyError;

pub type Result<T> = std::result::Result<T, CqfError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CqfError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Terminology(#[from] TerminologyError),

    #[error(transparent)]
    Retrieve(#[from] RetrieveError),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

impl CqfError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Model(err) => err.code(),
            Self::Version(err) => err.code(),
            Self::Path(err) => err.code(),
            Self::Repository(err) => err.code(),
            Self::Terminology(err) => err.code(),
            Self::Retrieve(err) => err.code(),
            Self::Library(err) => err.code(),
            Self::Endpoint(err) => err.code(),
        }
    }

    /// 4xx for lookups and conflicts, 5xx for misbehaving backends
    pub fn status_class(&self) -> StatusClass {
        self.code().status_class()
    }

    pub fn http_status(&self) -> u16 {
        self.code().http_status()
    }
}
