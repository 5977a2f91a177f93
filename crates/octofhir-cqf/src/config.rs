//! Settings
//!
//! All sections are optional in the JSON form; missing fields take their defaults.
//!
//! ```json
//! {
//!   "model": { "search_paths": ["./modelinfo"] },
//!   "terminology": { "pre_expansion": "USE_IF_PRESENT", "compose_fallback": true },
//!   "retrieve": { "profile_mode": "DECLARED", "filter_by_context": true }
//! }
//! ```

use anyhow::{Context, Result};
use octofhir_cqf_model::DirectoryModelInfoLoader;
use octofhir_cqf_retrieve::RetrieveSettings;
use octofhir_cqf_terminology::TerminologySettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where model info documents are looked up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
}

impl ModelSettings {
    /// A loader over the configured search paths, searched in order
    pub fn loader(&self) -> DirectoryModelInfoLoader {
        DirectoryModelInfoLoader::new(self.search_paths.iter().cloned())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CqfSettings {
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default)]
    pub terminology: TerminologySettings,
    #[serde(default)]
    pub retrieve: RetrieveSettings,
}

impl CqfSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings")
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let mut settings = Self::from_json_str(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;

        // relative search paths are relative to the settings file
        if let Some(base) = path.parent() {
            for search_path in &mut settings.model.search_paths {
                if search_path.is_relative() {
                    *search_path = base.join(&*search_path);
                }
            }
        }
        Ok(settings)
    }
}
