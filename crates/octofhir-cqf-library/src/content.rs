//! Library content loading
//!
//! FHIR Library resources carry their source as base64 attachments in `content[]`.
//! `text/cql` attachments are decoded as UTF-8 CQL, `application/elm+json` as ELM
//! JSON. Other content types are ignored.

use crate::error::LibraryError;
use crate::selector::{LibraryVersionSelector, VersionedArtifact};
use base64::Engine;
use log::debug;
use octofhir_cqf_model::VersionedIdentifier;
use octofhir_cqf_repository::{Repository, SearchParams};
use serde_json::Value;
use std::sync::Arc;

pub const CQL_CONTENT_TYPE: &str = "text/cql";
pub const ELM_JSON_CONTENT_TYPE: &str = "application/elm+json";

/// Decoded source of one library
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryContent {
    pub identifier: VersionedIdentifier,
    pub cql: Option<String>,
    pub elm: Option<Value>,
}

impl LibraryContent {
    /// Decode the CQL and ELM attachments of a Library resource.
    ///
    /// A library without either is invalid.
    pub fn from_resource(library: &Value) -> Result<Self, LibraryError> {
        let name = library
            .name()
            .ok_or_else(|| LibraryError::invalid_content("<unnamed>", "Library has neither name nor url"))?;
        let identifier = match library.version() {
            Some(version) => VersionedIdentifier::with_version(name, version),
            None => VersionedIdentifier::new(name),
        };

        let mut cql = None;
        let mut elm = None;
        for attachment in library
            .get("content")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let content_type = attachment
                .get("contentType")
                .and_then(Value::as_str)
                .unwrap_or_default();
            match content_type {
                CQL_CONTENT_TYPE if cql.is_none() => {
                    let bytes = decode_attachment(name, attachment)?;
                    let source = String::from_utf8(bytes).map_err(|e| {
                        LibraryError::invalid_content(name, format!("CQL content is not UTF-8: {e}"))
                    })?;
                    cql = Some(source);
                }
                ELM_JSON_CONTENT_TYPE if elm.is_none() => {
                    let bytes = decode_attachment(name, attachment)?;
                    let parsed = serde_json::from_slice(&bytes).map_err(|e| {
                        LibraryError::invalid_content(name, format!("ELM content is not valid JSON: {e}"))
                    })?;
                    elm = Some(parsed);
                }
                other => debug!("Ignoring {other:?} content of library {name}"),
            }
        }

        if cql.is_none() && elm.is_none() {
            return Err(LibraryError::invalid_content(
                name,
                "No text/cql or application/elm+json content",
            ));
        }

        Ok(Self { identifier, cql, elm })
    }
}

impl VersionedArtifact for LibraryContent {
    fn name(&self) -> Option<&str> {
        Some(&self.identifier.id)
    }

    fn version(&self) -> Option<&str> {
        self.identifier.version()
    }
}

fn decode_attachment(library: &str, attachment: &Value) -> Result<Vec<u8>, LibraryError> {
    let data = attachment
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| LibraryError::invalid_content(library, "Attachment is missing its data"))?;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| LibraryError::invalid_content(library, format!("Failed to decode base64 content: {e}")))
}

/// Source of library content for a compiler
pub trait LibraryContentProvider: Send + Sync {
    /// Content of the library best matching `identifier`, `Ok(None)` when there is none
    fn library_content(&self, identifier: &VersionedIdentifier) -> Result<Option<LibraryContent>, LibraryError>;
}

/// Loads Library resources from a repository by name and picks a version with
/// `LibraryVersionSelector`
pub struct RepositoryLibraryContentProvider {
    repository: Arc<dyn Repository>,
}

impl RepositoryLibraryContentProvider {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }
}

impl LibraryContentProvider for RepositoryLibraryContentProvider {
    fn library_content(&self, identifier: &VersionedIdentifier) -> Result<Option<LibraryContent>, LibraryError> {
        let params = SearchParams::new().with_param("name", identifier.id.clone());
        let candidates = self.repository.search("Library", &params)?;
        debug!("Found {} Library candidates for {identifier}", candidates.len());

        LibraryVersionSelector::select(identifier, &candidates)?
            .map(LibraryContent::from_resource)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use octofhir_cqf_repository::InMemoryRepository;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn library(id: &str, version: &str, cql: &str) -> Value {
        json!({
            "resourceType": "Library",
            "id": id,
            "name": "Common",
            "version": version,
            "content": [{ "contentType": "text/cql", "data": STANDARD.encode(cql) }]
        })
    }

    #[test]
    fn test_decodes_cql_and_elm() {
        let elm = json!({ "library": { "identifier": { "id": "Common" } } });
        let resource = json!({
            "resourceType": "Library",
            "name": "Common",
            "version": "1.0.0",
            "content": [
                { "contentType": "application/elm+xml", "data": STANDARD.encode("<library/>") },
                { "contentType": "text/cql", "data": STANDARD.encode("library Common version '1.0.0'") },
                { "contentType": "application/elm+json", "data": STANDARD.encode(elm.to_string()) }
            ]
        });

        let content = LibraryContent::from_resource(&resource).unwrap();
        assert_eq!(content.identifier, VersionedIdentifier::with_version("Common", "1.0.0"));
        assert_eq!(content.cql.as_deref(), Some("library Common version '1.0.0'"));
        assert_eq!(content.elm, Some(elm));
    }

    #[test]
    fn test_missing_content_is_invalid() {
        let resource = json!({ "resourceType": "Library", "name": "Empty" });
        let err = LibraryContent::from_resource(&resource).unwrap_err();
        assert!(matches!(err, LibraryError::InvalidContent { ref library, .. } if library == "Empty"));
    }

    #[test]
    fn test_bad_base64_is_invalid() {
        let resource = json!({
            "resourceType": "Library",
            "name": "Broken",
            "content": [{ "contentType": "text/cql", "data": "not base64!" }]
        });
        assert!(matches!(
            LibraryContent::from_resource(&resource),
            Err(LibraryError::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_repository_provider_selects_version() {
        let repository = InMemoryRepository::from_resources([
            library("common-1", "1.0.0", "library Common version '1.0.0'"),
            library("common-2", "2.0.0", "library Common version '2.0.0'"),
        ])
        .unwrap();
        let provider = RepositoryLibraryContentProvider::new(Arc::new(repository));

        let latest = provider
            .library_content(&VersionedIdentifier::new("Common"))
            .unwrap()
            .unwrap();
        assert_eq!(latest.cql.as_deref(), Some("library Common version '2.0.0'"));

        let pinned = provider
            .library_content(&VersionedIdentifier::with_version("Common", "1.0.0"))
            .unwrap()
            .unwrap();
        assert_eq!(pinned.identifier.version(), Some("1.0.0"));

        assert!(provider
            .library_content(&VersionedIdentifier::new("Missing"))
            .unwrap()
            .is_none());
    }
}
