//! Path resolution over JSON clinical resources
//!
//! Missing data is not an error in CQL: a path that does not exist on a resource
//! resolves to `Ok(None)`. Only a malformed path is reported as `PathError`.

use crate::fhir::FhirVersion;
use octofhir_cqf_diagnostics::{ErrorCode, CQF0103};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl PathError {
    fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        CQF0103
    }
}

/// Resolves property paths and context relationships for one data model
pub trait ModelResolver: Send + Sync {
    fn package_name(&self) -> &str;

    fn fhir_version(&self) -> FhirVersion;

    /// Resolve a dotted path (`code.coding`, `name[0].given`) against `target`
    fn resolve_path(&self, target: &Value, path: &str) -> Result<Option<Value>, PathError>;

    /// Path on `target_type` that links it to a `context_type` instance, if any
    fn context_path(&self, context_type: &str, target_type: &str) -> Option<String>;

    fn resource_type<'a>(&self, resource: &'a Value) -> Option<&'a str> {
        resource.get("resourceType").and_then(Value::as_str)
    }
}

/// JSON-backed resolver for FHIR resources
#[derive(Debug, Clone)]
pub struct FhirModelResolver {
    version: FhirVersion,
}

impl FhirModelResolver {
    pub fn new(version: FhirVersion) -> Self {
        Self { version }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Segment<'a> {
    name: &'a str,
    index: Option<usize>,
}

fn parse_path(path: &str) -> Result<Vec<Segment<'_>>, PathError> {
    if path.is_empty() {
        return Err(PathError::invalid(path, "path is empty"));
    }

    path.split('.')
        .map(|raw| {
            let (name, index) = match raw.find('[') {
                Some(open) => {
                    let inner = raw[open + 1..]
                        .strip_suffix(']')
                        .ok_or_else(|| PathError::invalid(path, format!("unbalanced indexer in '{raw}'")))?;
                    let index = inner
                        .parse::<usize>()
                        .map_err(|_| PathError::invalid(path, format!("indexer '{inner}' is not a number")))?;
                    (&raw[..open], Some(index))
                }
                None if raw.contains(']') => {
                    return Err(PathError::invalid(path, format!("unbalanced indexer in '{raw}'")));
                }
                None => (raw, None),
            };
            if name.is_empty() {
                return Err(PathError::invalid(path, "empty path segment"));
            }
            Ok(Segment { name, index })
        })
        .collect()
}

/// `value` also matches choice elements such as `valueQuantity` or `valueString`
fn child<'a>(object: &'a serde_json::Map<String, Value>, name: &str) -> Option<&'a Value> {
    object.get(name).or_else(|| {
        object.iter().find_map(|(key, value)| {
            key.strip_prefix(name)
                .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
                .map(|_| value)
        })
    })
}

impl ModelResolver for FhirModelResolver {
    fn package_name(&self) -> &str {
        "org.hl7.fhir"
    }

    fn fhir_version(&self) -> FhirVersion {
        self.version
    }

    fn resolve_path(&self, target: &Value, path: &str) -> Result<Option<Value>, PathError> {
        let segments = parse_path(path)?;
        let mut current: Vec<&Value> = vec![target];

        for segment in segments {
            let mut next = Vec::new();
            for value in current {
                let Some(object) = value.as_object() else {
                    continue;
                };
                match child(object, segment.name) {
                    Some(Value::Array(items)) => next.extend(items.iter()),
                    Some(Value::Null) | None => {}
                    Some(found) => next.push(found),
                }
            }
            if let Some(index) = segment.index {
                next = next.get(index).copied().into_iter().collect();
            }
            if next.is_empty() {
                return Ok(None);
            }
            current = next;
        }

        Ok(match current.as_slice() {
            [] => None,
            [single] => Some((*single).clone()),
            many => Some(Value::Array(many.iter().map(|v| (*v).clone()).collect())),
        })
    }

    fn context_path(&self, context_type: &str, target_type: &str) -> Option<String> {
        if context_type != "Patient" {
            return None;
        }
        let path = match target_type {
            "Patient" => "id",
            "AllergyIntolerance" | "Claim" | "ClaimResponse" | "Immunization" | "Account"
            | "DetectedIssue" => "patient",
            "Coverage" => "beneficiary",
            "Appointment" | "Group" | "Person" | "Practitioner" | "Organization"
            | "Location" | "Medication" | "ValueSet" | "CodeSystem" | "Library" => return None,
            _ => "subject",
        };
        Some(path.to_string())
    }
}
