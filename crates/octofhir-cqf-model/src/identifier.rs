//! Versioned identifiers for models and libraries

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, optionally versioned artifact (a data model or a library).
///
/// Equality is by the `(id, version)` pair. When used as a lookup request an absent
/// version means "any version"; when used as a storage key it is the concrete
/// "no version" value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionedIdentifier {
    pub id: String,
    pub version: Option<String>,
}

impl VersionedIdentifier {
    /// Create an unversioned identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
        }
    }

    /// Create an identifier with a version
    pub fn with_version(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: Some(version.into()),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Whether `other` satisfies this identifier used as a request
    pub fn matches(&self, other: &VersionedIdentifier) -> bool {
        self.id == other.id
            && match &self.version {
                Some(version) => other.version.as_ref() == Some(version),
                None => true,
            }
    }

    /// The same identifier without its version
    pub fn unversioned(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl fmt::Display for VersionedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} version '{}'", self.id, version),
            None => write!(f, "{}", self.id),
        }
    }
}
