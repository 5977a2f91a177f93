//! Terminology errors

use octofhir_cqf_diagnostics::{ErrorCode, CQF0003, CQF0101, CQF0302, CQF0303};
use octofhir_cqf_repository::RepositoryError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TerminologyError {
    #[error("Unknown value set: {url}")]
    UnknownValueSet { url: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Value set {url} has no expansion and pre-expansion is required")]
    ExpansionRequired { url: String },

    #[error("Unable to expand value set {url}: {reason}")]
    ExpansionFailed { url: String, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl TerminologyError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownValueSet { .. } => CQF0003,
            Self::InvalidArgument(_) => CQF0101,
            Self::ExpansionRequired { .. } => CQF0302,
            Self::ExpansionFailed { .. } => CQF0303,
            Self::Repository(err) => err.code(),
        }
    }
}
