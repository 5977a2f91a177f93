//! Library version selection
//!
//! Candidates are filtered by name. A request without a version gets the highest
//! version among them (an unversioned candidate counts as the highest); a request
//! with a version gets the first candidate carrying exactly that version string.

use octofhir_cqf_model::{is_newer, VersionError, VersionedIdentifier};
use serde_json::Value;

/// Anything with a library name and an optional version
pub trait VersionedArtifact {
    fn name(&self) -> Option<&str>;
    fn version(&self) -> Option<&str>;
}

/// FHIR Library resources: `name`, falling back to the last segment of `url`
impl VersionedArtifact for Value {
    fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str).or_else(|| {
            self.get("url")
                .and_then(Value::as_str)
                .and_then(|url| url.rsplit('/').next())
                .filter(|tail| !tail.is_empty())
        })
    }

    fn version(&self) -> Option<&str> {
        self.get("version").and_then(Value::as_str)
    }
}

impl<A: VersionedArtifact + ?Sized> VersionedArtifact for &A {
    fn name(&self) -> Option<&str> {
        (**self).name()
    }

    fn version(&self) -> Option<&str> {
        (**self).version()
    }
}

pub struct LibraryVersionSelector;

impl LibraryVersionSelector {
    /// Pick the candidate that best satisfies `requested`.
    ///
    /// Returns `Ok(None)` when no candidate has the requested name. A malformed
    /// candidate version is an error when versions have to be ordered.
    pub fn select<'a, A, I>(
        requested: &VersionedIdentifier,
        candidates: I,
    ) -> Result<Option<&'a A>, VersionError>
    where
        A: VersionedArtifact + ?Sized + 'a,
        I: IntoIterator<Item = &'a A>,
    {
        let mut named = candidates
            .into_iter()
            .filter(|candidate| candidate.name() == Some(requested.id.as_str()));

        match requested.version() {
            Some(version) => Ok(named.find(|candidate| candidate.version() == Some(version))),
            None => {
                let mut highest: Option<&'a A> = None;
                for candidate in named {
                    let replace = match highest {
                        None => true,
                        Some(current) => is_newer(candidate.version(), current.version())?,
                    };
                    if replace {
                        highest = Some(candidate);
                    }
                }
                Ok(highest)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn library(name: &str, version: Option<&str>) -> Value {
        let mut library = json!({ "resourceType": "Library", "name": name });
        if let Some(version) = version {
            library["version"] = json!(version);
        }
        library
    }

    fn candidates() -> Vec<Value> {
        vec![
            library("Lib", Some("1.0.0")),
            library("Lib", Some("2.0.0")),
            library("Other", Some("9.9.9")),
        ]
    }

    #[test]
    fn test_latest_wins_without_requested_version() {
        let candidates = candidates();
        let selected = LibraryVersionSelector::select(&VersionedIdentifier::new("Lib"), &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(selected.version(), Some("2.0.0"));
    }

    #[test]
    fn test_exact_version() {
        let candidates = candidates();
        let requested = VersionedIdentifier::with_version("Lib", "1.0.0");
        let selected = LibraryVersionSelector::select(&requested, &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(selected.version(), Some("1.0.0"));
    }

    #[test]
    fn test_unknown_name_is_absent() {
        let candidates = candidates();
        let missing = VersionedIdentifier::new("Missing");
        assert!(LibraryVersionSelector::select(&missing, &candidates).unwrap().is_none());

        let missing_version = VersionedIdentifier::with_version("Lib", "3.0.0");
        assert!(LibraryVersionSelector::select(&missing_version, &candidates).unwrap().is_none());
    }

    #[test]
    fn test_unversioned_candidate_counts_as_latest() {
        let candidates = vec![
            library("Lib", Some("1.0.0")),
            library("Lib", None),
            library("Lib", Some("5.0.0")),
        ];
        let selected = LibraryVersionSelector::select(&VersionedIdentifier::new("Lib"), &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(selected.version(), None);
    }

    #[test]
    fn test_first_seen_wins_ties() {
        let candidates = vec![
            json!({ "name": "Lib", "version": "1.0", "id": "first" }),
            json!({ "name": "Lib", "version": "1.0.0", "id": "second" }),
        ];
        let selected = LibraryVersionSelector::select(&VersionedIdentifier::new("Lib"), &candidates)
            .unwrap()
            .unwrap();
        assert_eq!(selected["id"], "first");
    }

    #[test]
    fn test_malformed_version_propagates() {
        let candidates = vec![library("Lib", Some("1.0.0")), library("Lib", Some("1.0-SNAPSHOT"))];
        let err = LibraryVersionSelector::select(&VersionedIdentifier::new("Lib"), &candidates)
            .unwrap_err();
        assert!(matches!(err, VersionError::InvalidSegment { .. }));
    }

    #[test]
    fn test_name_falls_back_to_url_tail() {
        let library = json!({
            "resourceType": "Library",
            "url": "http://example.org/Library/FHIRHelpers",
            "version": "4.0.1"
        });
        assert_eq!(library.name(), Some("FHIRHelpers"));
    }
}
