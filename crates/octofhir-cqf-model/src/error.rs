//! Model resolution errors

use crate::identifier::VersionedIdentifier;
use octofhir_cqf_diagnostics::{ErrorCode, CQF0001, CQF0005, CQF0100, CQF0300, CQF0401};

/// Errors raised while loading or resolving data models
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("Model not found: {identifier}")]
    NotFound { identifier: VersionedIdentifier },

    #[error(
        "Version conflict for model {id}: version {loaded} is already in use, version {requested} was requested"
    )]
    VersionConflict {
        id: String,
        loaded: String,
        requested: String,
    },

    #[error("ModelInfo parse error: {0}")]
    Parse(String),

    #[error("Unsupported FHIR version: {0}")]
    UnsupportedFhirVersion(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ModelError {
    pub fn not_found(identifier: &VersionedIdentifier) -> Self {
        Self::NotFound {
            identifier: identifier.clone(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => CQF0001,
            Self::VersionConflict { .. } => CQF0100,
            Self::Parse(_) => CQF0300,
            Self::UnsupportedFhirVersion(_) => CQF0005,
            Self::Io(_) => CQF0401,
        }
    }
}

impl From<crate::model_info::ParseError> for ModelError {
    fn from(err: crate::model_info::ParseError) -> Self {
        Self::Parse(err.to_string())
    }
}
