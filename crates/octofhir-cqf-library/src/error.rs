//! Library errors

use octofhir_cqf_diagnostics::{ErrorCode, CQF0002, CQF0202, CQF0305};
use octofhir_cqf_model::{VersionError, VersionedIdentifier};
use octofhir_cqf_repository::RepositoryError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LibraryError {
    #[error("Library not found: {identifier}")]
    NotFound { identifier: VersionedIdentifier },

    #[error("Failed to compile library {identifier}: {message}")]
    Compile {
        identifier: VersionedIdentifier,
        message: String,
    },

    #[error("Invalid content in library {library}: {reason}")]
    InvalidContent { library: String, reason: String },

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl LibraryError {
    pub fn not_found(identifier: &VersionedIdentifier) -> Self {
        Self::NotFound {
            identifier: identifier.clone(),
        }
    }

    pub fn compile(identifier: &VersionedIdentifier, message: impl Into<String>) -> Self {
        Self::Compile {
            identifier: identifier.clone(),
            message: message.into(),
        }
    }

    pub fn invalid_content(library: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidContent {
            library: library.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => CQF0002,
            Self::Compile { .. } => CQF0202,
            Self::InvalidContent { .. } => CQF0305,
            Self::Version(err) => err.code(),
            Self::Repository(err) => err.code(),
        }
    }
}
