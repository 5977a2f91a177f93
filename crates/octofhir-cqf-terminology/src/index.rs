//! In-memory value set index

use crate::code::{Code, ValueSetInfo};
use crate::error::TerminologyError;
use crate::expansion::{expand_value_set, value_set_url, ValueSetExpansion};
use crate::settings::TerminologySettings;
use indexmap::IndexMap;
use log::{debug, warn};
use octofhir_cqf_diagnostics::Diagnostic;
use octofhir_cqf_model::is_newer;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Expanded {
    Ready(Arc<ValueSetExpansion>),
    /// Kept so that using this value set reports why it is unusable
    Failed(TerminologyError),
}

#[derive(Debug, Clone)]
struct Slot {
    version: Option<String>,
    expanded: Expanded,
}

/// Value set members keyed by canonical url, `url|version`, and resource id.
///
/// When several versions share a url, the bare url refers to the highest version.
/// Of several value sets with the same url and version, the first one is kept.
#[derive(Debug, Default)]
pub struct TerminologyIndex {
    entries: IndexMap<String, Slot>,
    diagnostics: Vec<Diagnostic>,
}

impl TerminologyIndex {
    /// Index every `ValueSet` among `resources`; other resource types are ignored.
    ///
    /// A value set that cannot be expanded is still indexed, as a failure.
    pub fn build<'a>(resources: impl IntoIterator<Item = &'a Value>, settings: &TerminologySettings) -> Self {
        let mut index = Self::default();

        for resource in resources {
            if resource.get("resourceType").and_then(Value::as_str) != Some("ValueSet") {
                continue;
            }
            let Some(url) = value_set_url(resource) else {
                debug!("Skipping ValueSet without url or id");
                continue;
            };

            let version = resource.get("version").and_then(Value::as_str).map(String::from);
            let expanded = match expand_value_set(resource, settings, &mut index.diagnostics) {
                Ok(expansion) => Expanded::Ready(Arc::new(expansion)),
                Err(err) => {
                    warn!("ValueSet {url} could not be expanded: {err}");
                    Expanded::Failed(err)
                }
            };
            let slot = Slot { version, expanded };

            if let Some(version) = &slot.version {
                let versioned = format!("{url}|{version}");
                if index.entries.contains_key(&versioned) {
                    warn!("Multiple ValueSets resolved for {versioned}, keeping the first one");
                    continue;
                }
                index.entries.insert(versioned, slot.clone());
            }
            if let Some(id) = resource.get("id").and_then(Value::as_str) {
                if id != url && !index.entries.contains_key(id) {
                    index.entries.insert(id.to_string(), slot.clone());
                }
            }
            index.insert_latest(url, slot);
        }

        debug!("Indexed {} value set keys", index.entries.len());
        index
    }

    fn insert_latest(&mut self, url: &str, slot: Slot) {
        let replace = match self.entries.get(url) {
            None => true,
            Some(existing) => match is_newer(slot.version.as_deref(), existing.version.as_deref()) {
                Ok(newer) => newer,
                Err(err) => {
                    warn!("Cannot order versions of ValueSet {url}, keeping the first one: {err}");
                    false
                }
            },
        };
        if replace {
            self.entries.insert(url.to_string(), slot);
        }
    }

    /// The expansion referenced by `value_set`
    pub fn expansion(&self, value_set: &ValueSetInfo) -> Result<&Arc<ValueSetExpansion>, TerminologyError> {
        if value_set.id.is_empty() {
            return Err(TerminologyError::InvalidArgument(
                "value set id must not be empty".to_string(),
            ));
        }
        let key = value_set.canonical();
        match self.entries.get(&key).map(|slot| &slot.expanded) {
            Some(Expanded::Ready(expansion)) => Ok(expansion),
            Some(Expanded::Failed(err)) => Err(err.clone()),
            None => Err(TerminologyError::UnknownValueSet { url: key }),
        }
    }

    pub fn contains(&self, code: &Code, value_set: &ValueSetInfo) -> Result<bool, TerminologyError> {
        Ok(self.expansion(value_set)?.contains(code))
    }

    pub fn expand(&self, value_set: &ValueSetInfo) -> Result<Vec<Code>, TerminologyError> {
        Ok(self.expansion(value_set)?.codes().to_vec())
    }

    /// Warnings recorded for degraded expansions
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of lookup keys (a value set may be reachable under several)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
