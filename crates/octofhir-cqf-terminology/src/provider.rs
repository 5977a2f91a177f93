//! Terminology providers

use crate::code::{Code, CodeSystemInfo, ValueSetInfo};
use crate::error::TerminologyError;
use crate::index::TerminologyIndex;
use crate::settings::TerminologySettings;
use log::{debug, warn};
use octofhir_cqf_diagnostics::Diagnostic;
use octofhir_cqf_repository::{bundle_resources, Repository, Resource, SearchParams};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Terminology operations used during evaluation
pub trait TerminologyProvider: Send + Sync {
    /// Whether `code` is a member of `value_set`. An unknown value set is an error.
    fn in_value_set(&self, code: &Code, value_set: &ValueSetInfo) -> Result<bool, TerminologyError>;

    fn expand(&self, value_set: &ValueSetInfo) -> Result<Vec<Code>, TerminologyError>;

    fn lookup(&self, code: &Code, code_system: &CodeSystemInfo) -> Result<Option<Code>, TerminologyError> {
        Ok(lookup_in_code_system(code, code_system))
    }
}

/// Partial code system lookup without the code system content: `code` is returned
/// when its system is `code_system` and its version is absent or equal.
pub fn lookup_in_code_system(code: &Code, code_system: &CodeSystemInfo) -> Option<Code> {
    let system = code.system.as_deref()?;
    let version_ok = code.version.is_none() || code.version == code_system.version;
    if system == code_system.id && version_ok {
        warn!("Unvalidated code system lookup: {} in {}", code, code_system.id);
        return Some(code.clone());
    }
    None
}

/// Terminology over the value sets contained in a bundle.
///
/// The index is built on first use and lives as long as this provider.
pub struct BundleTerminologyProvider {
    resources: Vec<Resource>,
    settings: TerminologySettings,
    index: OnceCell<TerminologyIndex>,
}

impl BundleTerminologyProvider {
    pub fn new(resources: Vec<Resource>, settings: TerminologySettings) -> Self {
        Self {
            resources,
            settings,
            index: OnceCell::new(),
        }
    }

    pub fn from_bundle(bundle: &Resource, settings: TerminologySettings) -> Result<Self, TerminologyError> {
        Ok(Self::new(bundle_resources(bundle)?, settings))
    }

    pub fn index(&self) -> &TerminologyIndex {
        self.index.get_or_init(|| {
            debug!("Building terminology index over {} bundle resources", self.resources.len());
            TerminologyIndex::build(self.resources.iter(), &self.settings)
        })
    }

    /// Degraded-result warnings, empty until the index has been built
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.index
            .get()
            .map(|index| index.diagnostics().to_vec())
            .unwrap_or_default()
    }
}

impl TerminologyProvider for BundleTerminologyProvider {
    fn in_value_set(&self, code: &Code, value_set: &ValueSetInfo) -> Result<bool, TerminologyError> {
        self.index().contains(code, value_set)
    }

    fn expand(&self, value_set: &ValueSetInfo) -> Result<Vec<Code>, TerminologyError> {
        self.index().expand(value_set)
    }
}

/// Terminology over the `ValueSet` resources of a repository.
///
/// A failed build (the repository search failed) is not cached; the next call retries.
pub struct RepositoryTerminologyProvider {
    repository: Arc<dyn Repository>,
    settings: TerminologySettings,
    index: OnceCell<TerminologyIndex>,
}

impl RepositoryTerminologyProvider {
    pub fn new(repository: Arc<dyn Repository>, settings: TerminologySettings) -> Self {
        Self {
            repository,
            settings,
            index: OnceCell::new(),
        }
    }

    pub fn index(&self) -> Result<&TerminologyIndex, TerminologyError> {
        self.index.get_or_try_init(|| {
            let value_sets = self.repository.search("ValueSet", &SearchParams::new())?;
            debug!("Building terminology index over {} repository value sets", value_sets.len());
            Ok(TerminologyIndex::build(value_sets.iter(), &self.settings))
        })
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.index
            .get()
            .map(|index| index.diagnostics().to_vec())
            .unwrap_or_default()
    }
}

impl TerminologyProvider for RepositoryTerminologyProvider {
    fn in_value_set(&self, code: &Code, value_set: &ValueSetInfo) -> Result<bool, TerminologyError> {
        self.index()?.contains(code, value_set)
    }

    fn expand(&self, value_set: &ValueSetInfo) -> Result<Vec<Code>, TerminologyError> {
        self.index()?.expand(value_set)
    }
}
