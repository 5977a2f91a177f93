//! Model info loaders
//!
//! A loader turns a `VersionedIdentifier` into a parsed `ModelInfo`. The directory
//! loader scans search paths for files named `{id}-modelinfo-{version}.xml` (or `.json`).

use crate::error::ModelError;
use crate::identifier::VersionedIdentifier;
use crate::model_info::{parse_json, parse_xml, ModelInfo};
use crate::version::is_newer;
use log::debug;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

/// Source of model info documents
pub trait ModelInfoLoader: Send + Sync {
    /// Load the model info for `identifier`. An absent version selects the highest available.
    fn load(&self, identifier: &VersionedIdentifier) -> Result<ModelInfo, ModelError>;
}

/// Pick the highest version, treating an unversioned entry as the highest of all
fn newest<'a, T>(
    candidates: impl Iterator<Item = (Option<&'a str>, T)>,
) -> Result<Option<T>, ModelError> {
    let mut best: Option<(Option<&'a str>, T)> = None;
    for (version, item) in candidates {
        let replace = match &best {
            None => true,
            Some((current, _)) => {
                is_newer(version, *current).map_err(|e| ModelError::Parse(e.to_string()))?
            }
        };
        if replace {
            best = Some((version, item));
        }
    }
    Ok(best.map(|(_, item)| item))
}

/// Loader over model infos registered in memory
#[derive(Default)]
pub struct InMemoryModelInfoLoader {
    models: RwLock<Vec<ModelInfo>>,
}

impl InMemoryModelInfoLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models(models: impl IntoIterator<Item = ModelInfo>) -> Self {
        Self {
            models: RwLock::new(models.into_iter().collect()),
        }
    }

    pub fn register(&self, model: ModelInfo) {
        self.models.write().push(model);
    }
}

impl ModelInfoLoader for InMemoryModelInfoLoader {
    fn load(&self, identifier: &VersionedIdentifier) -> Result<ModelInfo, ModelError> {
        let models = self.models.read();
        let mut same_name = models.iter().filter(|m| m.name == identifier.id);

        let found = match identifier.version() {
            Some(requested) => same_name.find(|m| m.version.as_deref() == Some(requested)),
            None => newest(same_name.map(|m| (m.version.as_deref(), m)))?,
        };

        found
            .cloned()
            .ok_or_else(|| ModelError::not_found(identifier))
    }
}

/// Loader that reads model info files from a list of directories
#[derive(Debug, Clone, Default)]
pub struct DirectoryModelInfoLoader {
    search_paths: Vec<PathBuf>,
}

impl DirectoryModelInfoLoader {
    pub fn new(search_paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// All `(version, path)` pairs for model `id` across the search paths
    fn candidates(&self, id: &str) -> Result<Vec<(Option<String>, PathBuf)>, ModelError> {
        let prefix = format!("{}-modelinfo", id.to_lowercase());
        let mut found = Vec::new();

        for dir in &self.search_paths {
            if !dir.is_dir() {
                debug!("Skipping missing model info directory {}", dir.display());
                continue;
            }
            let entries = std::fs::read_dir(dir).map_err(|e| ModelError::Io(e.to_string()))?;
            for entry in entries {
                let path = entry.map_err(|e| ModelError::Io(e.to_string()))?.path();
                if let Some(version) = version_from_file_name(&path, &prefix) {
                    found.push((version, path));
                }
            }
        }
        Ok(found)
    }
}

/// `fhir-modelinfo-4.0.1.xml` with prefix `fhir-modelinfo` yields `Some(Some("4.0.1"))`,
/// `fhir-modelinfo.xml` yields `Some(None)`
fn version_from_file_name(path: &Path, prefix: &str) -> Option<Option<String>> {
    let extension = path.extension()?.to_str()?;
    if !matches!(extension, "xml" | "json") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?.to_lowercase();
    let rest = stem.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(None);
    }
    rest.strip_prefix('-').map(|v| Some(v.to_string()))
}

fn read_model_info(path: &Path) -> Result<ModelInfo, ModelError> {
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::Io(e.to_string()))?;
    let parsed = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => parse_json(&content)?,
        _ => parse_xml(&content)?,
    };
    Ok(parsed)
}

impl ModelInfoLoader for DirectoryModelInfoLoader {
    fn load(&self, identifier: &VersionedIdentifier) -> Result<ModelInfo, ModelError> {
        let candidates = self.candidates(&identifier.id)?;

        let path = match identifier.version() {
            Some(requested) => candidates
                .iter()
                .find(|(version, _)| version.as_deref() == Some(requested))
                .map(|(_, path)| path),
            None => newest(candidates.iter().map(|(v, p)| (v.as_deref(), p)))?,
        };
        let path = path.ok_or_else(|| ModelError::not_found(identifier))?;

        debug!("Loading model info {} from {}", identifier, path.display());
        let info = read_model_info(path)?;

        // a file named for one version must not smuggle in another
        if let (Some(requested), Some(declared)) = (identifier.version(), info.version.as_deref()) {
            if requested != declared {
                return Err(ModelError::VersionConflict {
                    id: identifier.id.clone(),
                    loaded: declared.to_string(),
                    requested: requested.to_string(),
                });
            }
        }
        Ok(info)
    }
}
