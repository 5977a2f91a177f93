//! In-memory retrieve filters
//!
//! Shared by the bundle and repository providers: data type, template (profile),
//! context relationship and terminology criteria. Date criteria are not applied.

use crate::error::RetrieveError;
use crate::request::RetrieveRequest;
use crate::settings::{ProfileMode, RetrieveSettings};
use log::debug;
use octofhir_cqf_model::ModelResolver;
use octofhir_cqf_repository::{resource_type, Resource};
use octofhir_cqf_terminology::{Code, TerminologyProvider, ValueSetInfo};
use serde_json::Value;
use std::sync::Arc;

const BASE_PROFILE_PREFIX: &str = "http://hl7.org/fhir/StructureDefinition/";

pub struct ResourceFilter {
    resolver: Arc<dyn ModelResolver>,
    terminology: Option<Arc<dyn TerminologyProvider>>,
    settings: RetrieveSettings,
}

impl ResourceFilter {
    pub fn new(resolver: Arc<dyn ModelResolver>) -> Self {
        Self {
            resolver,
            terminology: None,
            settings: RetrieveSettings::default(),
        }
    }

    #[must_use]
    pub fn with_terminology(mut self, terminology: Arc<dyn TerminologyProvider>) -> Self {
        self.terminology = Some(terminology);
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RetrieveSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &RetrieveSettings {
        &self.settings
    }

    /// Clone the resources that satisfy every criterion of `request`
    pub fn apply<'a>(
        &self,
        request: &RetrieveRequest,
        resources: impl IntoIterator<Item = &'a Resource>,
    ) -> Result<Vec<Resource>, RetrieveError> {
        let mut matched = Vec::new();
        for resource in resources {
            if self.matches(request, resource)? {
                matched.push(resource.clone());
            }
        }
        Ok(matched)
    }

    pub fn matches(&self, request: &RetrieveRequest, resource: &Resource) -> Result<bool, RetrieveError> {
        Ok(resource_type(resource) == Some(request.data_type.as_str())
            && self.matches_template(request, resource)
            && self.matches_context(request, resource)?
            && self.matches_terminology(request, resource)?)
    }

    fn matches_template(&self, request: &RetrieveRequest, resource: &Resource) -> bool {
        if self.settings.profile_mode == ProfileMode::Off {
            return true;
        }
        let Some(template_id) = request.template_id.as_deref() else {
            return true;
        };
        let base_profile = format!("{BASE_PROFILE_PREFIX}{}", request.data_type);
        if template_id.starts_with(&base_profile) {
            return true;
        }

        let profiles: Vec<&str> = resource
            .pointer("/meta/profile")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .collect();

        if profiles.is_empty() {
            return self.settings.profile_mode == ProfileMode::Optional;
        }
        profiles.contains(&template_id)
    }

    fn matches_context(&self, request: &RetrieveRequest, resource: &Resource) -> Result<bool, RetrieveError> {
        if !self.settings.filter_by_context {
            return Ok(true);
        }
        let (Some(_), Some(path), Some(expected)) = (
            request.context.as_deref(),
            request.context_path.as_deref(),
            request.context_value.as_deref(),
        ) else {
            debug!(
                "Unable to relate {} to {:?} context, returning unfiltered resources",
                request.data_type, request.context
            );
            return Ok(true);
        };

        let Some(value) = self.resolver.resolve_path(resource, path)? else {
            debug!("Found {} resource unrelated to context, skipping", request.data_type);
            return Ok(false);
        };

        let related = match &value {
            Value::Array(items) => items.iter().any(|item| refers_to(item, expected)),
            single => refers_to(single, expected),
        };
        Ok(related)
    }

    fn matches_terminology(&self, request: &RetrieveRequest, resource: &Resource) -> Result<bool, RetrieveError> {
        if request.codes.is_none() && request.value_set.is_none() {
            return Ok(true);
        }
        let Some(code_path) = request.code_path.as_deref() else {
            return Ok(true);
        };
        let Some(value) = self.resolver.resolve_path(resource, code_path)? else {
            return Ok(false);
        };

        // a primitive at the code path is an id-style filter, e.g. `Medication/med-1`
        if let Value::String(primitive) = &value {
            let prefix = format!("{}/", request.data_type);
            let id = primitive.replace(&prefix, "");
            return Ok(request
                .codes
                .iter()
                .flatten()
                .any(|code| code.code.as_deref() == Some(id.as_str())));
        }

        let resource_codes = Code::from_element(&value);

        if let Some(codes) = &request.codes {
            let any_match = resource_codes.iter().any(|candidate| {
                candidate.system.is_some()
                    && codes
                        .iter()
                        .any(|code| candidate.matches(code))
            });
            if any_match {
                return Ok(true);
            }
        }

        if let Some(value_set) = request.value_set.as_deref() {
            let terminology = self
                .terminology
                .as_ref()
                .ok_or_else(|| RetrieveError::TerminologyUnavailable {
                    value_set: value_set.to_string(),
                })?;
            let info = ValueSetInfo::new(value_set);
            for candidate in &resource_codes {
                if terminology.in_value_set(candidate, &info)? {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}

/// Whether an id, reference string or Reference object points at `expected`
fn refers_to(value: &Value, expected: &str) -> bool {
    let reference = match value {
        Value::String(s) => s.as_str(),
        Value::Object(object) => match object.get("reference").and_then(Value::as_str) {
            Some(reference) => reference,
            None => return false,
        },
        _ => return false,
    };
    id_part(reference) == expected
}

/// `Patient/123`, `http://x/fhir/Patient/123/_history/2` and `urn:uuid:123` all yield `123`
fn id_part(reference: &str) -> &str {
    let reference = reference
        .strip_prefix("urn:uuid:")
        .or_else(|| reference.strip_prefix("urn:oid:"))
        .unwrap_or(reference);
    let reference = reference
        .find("/_history/")
        .map_or(reference, |at| &reference[..at]);
    reference.rsplit('/').next().unwrap_or(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_cqf_model::{FhirModelResolver, FhirVersion};
    use rstest::rstest;
    use serde_json::json;

    fn filter() -> ResourceFilter {
        ResourceFilter::new(Arc::new(FhirModelResolver::new(FhirVersion::R4)))
    }

    #[rstest]
    #[case("Patient/123", "123")]
    #[case("http://example.org/fhir/Patient/123/_history/2", "123")]
    #[case("urn:uuid:e527283b", "e527283b")]
    #[case("urn:oid:1.2.3", "1.2.3")]
    #[case("123", "123")]
    fn test_id_part(#[case] reference: &str, #[case] expected: &str) {
        assert_eq!(id_part(reference), expected);
    }

    #[rstest]
    #[case(ProfileMode::Declared, json!(["http://example.org/profile"]), true)]
    #[case(ProfileMode::Declared, json!(["http://example.org/other"]), false)]
    #[case(ProfileMode::Declared, json!([]), false)]
    #[case(ProfileMode::Optional, json!([]), true)]
    #[case(ProfileMode::Optional, json!(["http://example.org/other"]), false)]
    #[case(ProfileMode::Off, json!(["http://example.org/other"]), true)]
    fn test_template_filter(#[case] mode: ProfileMode, #[case] profiles: Value, #[case] expected: bool) {
        let filter = filter().with_settings(RetrieveSettings::default().with_profile_mode(mode));
        let condition = json!({"resourceType": "Condition", "id": "c", "meta": {"profile": profiles}});
        let request = RetrieveRequest::new("Condition").with_template("http://example.org/profile");

        assert_eq!(filter.matches(&request, &condition).unwrap(), expected);
    }

    #[test]
    fn test_base_profile_is_not_a_filter() {
        let condition = json!({"resourceType": "Condition", "id": "c"});
        let request = RetrieveRequest::new("Condition")
            .with_template("http://hl7.org/fhir/StructureDefinition/Condition");
        assert!(filter().matches(&request, &condition).unwrap());
    }

    #[test]
    fn test_context_over_reference_list() {
        let encounter = json!({
            "resourceType": "CareTeam",
            "id": "ct",
            "participant": [
                {"member": {"reference": "Practitioner/a"}},
                {"member": {"reference": "Patient/p1"}}
            ]
        });
        let request = RetrieveRequest::new("CareTeam").with_context("Patient", Some("participant.member"), "p1");
        assert!(filter().matches(&request, &encounter).unwrap());

        let other = RetrieveRequest::new("CareTeam").with_context("Patient", Some("participant.member"), "p2");
        assert!(!filter().matches(&other, &encounter).unwrap());
    }

    #[test]
    fn test_invalid_context_path_is_an_error() {
        let condition = json!({"resourceType": "Condition", "id": "c"});
        let request = RetrieveRequest::new("Condition").with_context("Patient", Some("subject..reference"), "p1");
        let err = filter().matches(&request, &condition).unwrap_err();
        assert!(matches!(err, RetrieveError::Path(_)));
    }
}
