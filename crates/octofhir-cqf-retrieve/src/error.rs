//! Retrieve errors

use octofhir_cqf_diagnostics::{ErrorCode, CQF0200, CQF0201, CQF0203};
use octofhir_cqf_model::PathError;
use octofhir_cqf_repository::RepositoryError;
use octofhir_cqf_terminology::TerminologyError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RetrieveError {
    /// A provider answered "unknown" instead of an empty result
    #[error("Retrieve provider at position {position} returned no result for {data_type}")]
    ContractViolation { position: usize, data_type: String },

    #[error("Unable to check code membership in ValueSet {value_set}: no terminology provider is configured")]
    TerminologyUnavailable { value_set: String },

    #[error("Retrieve backend failure: {message}")]
    Backend { message: String },

    #[error(transparent)]
    Terminology(#[from] TerminologyError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Path(#[from] PathError),
}

impl RetrieveError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ContractViolation { .. } => CQF0200,
            Self::TerminologyUnavailable { .. } => CQF0201,
            Self::Backend { .. } => CQF0203,
            Self::Terminology(err) => err.code(),
            Self::Repository(err) => err.code(),
            Self::Path(err) => err.code(),
        }
    }
}
