//! Repository errors

use octofhir_cqf_diagnostics::{ErrorCode, CQF0004, CQF0101, CQF0203, CQF0301};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("Resource not found: {resource_type}/{id}")]
    NotFound { resource_type: String, id: String },

    #[error("Invalid resource: {message}")]
    InvalidResource { message: String },

    #[error("Invalid bundle: {message}")]
    InvalidBundle { message: String },

    /// The backing store failed; the message comes from the backend
    #[error("Repository backend failure: {message}")]
    Backend { message: String },
}

impl RepositoryError {
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn invalid_resource(message: impl Into<String>) -> Self {
        Self::InvalidResource {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => CQF0004,
            Self::InvalidResource { .. } => CQF0101,
            Self::InvalidBundle { .. } => CQF0301,
            Self::Backend { .. } => CQF0203,
        }
    }
}
