//! FHIR version support
//!
//! Each supported FHIR release maps to a model-info version and a resolver factory
//! registered in `ModelResolverRegistry`.

mod registry;

pub use registry::{ModelResolverFactory, ModelResolverRegistry};

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FhirVersion {
    Dstu3,
    R4,
    R5,
}

impl FhirVersion {
    pub const ALL: [FhirVersion; 3] = [FhirVersion::Dstu3, FhirVersion::R4, FhirVersion::R5];

    /// Version of the FHIR model info describing this release
    pub fn model_version(self) -> &'static str {
        match self {
            Self::Dstu3 => "3.0.1",
            Self::R4 => "4.0.1",
            Self::R5 => "5.0.0",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dstu3 => "DSTU3",
            Self::R4 => "R4",
            Self::R5 => "R5",
        }
    }
}

impl fmt::Display for FhirVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FhirVersion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let version = match s.to_ascii_uppercase().as_str() {
            "DSTU3" | "STU3" => Self::Dstu3,
            "R4" => Self::R4,
            "R5" => Self::R5,
            _ if s.starts_with("3.0") => Self::Dstu3,
            _ if s.starts_with("4.0") => Self::R4,
            _ if s.starts_with("5.0") => Self::R5,
            _ => return Err(ModelError::UnsupportedFhirVersion(s.to_string())),
        };
        Ok(version)
    }
}
