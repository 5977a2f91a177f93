//! ModelInfo structures describing a data model

use crate::identifier::VersionedIdentifier;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// ModelInfo structure describing a data model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name (e.g., "FHIR")
    pub name: String,
    /// Model version
    pub version: Option<String>,
    /// Model URL (e.g., "http://hl7.org/fhir")
    pub url: Option<String>,
    /// Target qualifier (namespace)
    pub target_qualifier: Option<String>,
    pub patient_class_name: Option<String>,
    pub patient_birth_date_property_name: Option<String>,
    /// Models this model is defined in terms of
    pub required_models: Vec<VersionedIdentifier>,
    /// Type definitions, in declaration order
    pub type_infos: IndexMap<String, TypeInfo>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
            ..Self::default()
        }
    }

    /// The identifier this model info declares for itself
    pub fn identifier(&self) -> VersionedIdentifier {
        VersionedIdentifier {
            id: self.name.clone(),
            version: self.version.clone(),
        }
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeInfo> {
        self.type_infos
            .get(name)
            .or_else(|| self.type_infos.get(self.unqualified(name)))
    }

    /// Property lookup that walks the base type chain
    pub fn get_property(&self, type_name: &str, property: &str) -> Option<&PropertyInfo> {
        let mut current = self.get_type(type_name)?;
        // base chains are short; the bound guards against cyclic model info
        for _ in 0..32 {
            if let Some(found) = current.get_property(property) {
                return Some(found);
            }
            current = self.get_type(current.base_type.as_deref()?)?;
        }
        None
    }

    pub fn is_retrievable(&self, type_name: &str) -> bool {
        self.get_type(type_name).is_some_and(|t| t.retrievable)
    }

    pub fn primary_code_path(&self, type_name: &str) -> Option<&str> {
        self.get_type(type_name)?.primary_code_path.as_deref()
    }

    pub fn retrievable_types(&self) -> impl Iterator<Item = &str> {
        self.type_infos
            .values()
            .filter(|t| t.retrievable)
            .map(|t| t.name.as_str())
    }

    fn unqualified<'a>(&self, name: &'a str) -> &'a str {
        self.target_qualifier
            .as_deref()
            .into_iter()
            .chain(std::iter::once(self.name.as_str()))
            .find_map(|qualifier| {
                name.strip_prefix(qualifier)
                    .and_then(|rest| rest.strip_prefix('.'))
            })
            .unwrap_or(name)
    }
}

/// Type information for a model type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    pub namespace: Option<String>,
    pub base_type: Option<String>,
    /// Whether this type can be the subject of a retrieve
    pub retrievable: bool,
    /// Primary code path for terminology filtering
    pub primary_code_path: Option<String>,
    pub elements: Vec<PropertyInfo>,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            base_type: None,
            retrievable: false,
            primary_code_path: None,
            elements: Vec::new(),
        }
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// Property information within a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    /// Element type with any `list<...>` wrapper removed
    pub element_type: String,
    pub is_list: bool,
    /// Target mapping (for FHIR path expressions)
    pub target: Option<String>,
}

impl PropertyInfo {
    /// Create a property from a type specifier such as `FHIR.Coding` or `list<FHIR.Coding>`
    pub fn new(name: impl Into<String>, type_specifier: &str) -> Self {
        let inner = type_specifier
            .strip_prefix("list<")
            .or_else(|| type_specifier.strip_prefix("List<"))
            .and_then(|rest| rest.strip_suffix('>'));

        Self {
            name: name.into(),
            element_type: inner.unwrap_or(type_specifier).to_string(),
            is_list: inner.is_some(),
            target: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> ModelInfo {
        let mut model = ModelInfo::new("FHIR", Some("4.0.1".to_string()));
        model.target_qualifier = Some("fhir".to_string());

        let mut resource = TypeInfo::new("Resource");
        resource.elements.push(PropertyInfo::new("id", "FHIR.id"));

        let mut condition = TypeInfo::new("Condition");
        condition.base_type = Some("FHIR.Resource".to_string());
        condition.retrievable = true;
        condition.primary_code_path = Some("code".to_string());
        condition
            .elements
            .push(PropertyInfo::new("code", "FHIR.CodeableConcept"));

        model.type_infos.insert("Resource".to_string(), resource);
        model.type_infos.insert("Condition".to_string(), condition);
        model
    }

    #[test]
    fn test_property_lookup_walks_base_types() {
        let model = sample_model();
        let id = model.get_property("Condition", "id").unwrap();
        assert_eq!(id.element_type, "FHIR.id");
        assert!(model.get_property("Condition", "missing").is_none());
    }

    #[test]
    fn test_qualified_type_names() {
        let model = sample_model();
        assert!(model.get_type("FHIR.Condition").is_some());
        assert!(model.get_type("fhir.Condition").is_some());
        assert!(model.is_retrievable("Condition"));
        assert_eq!(model.primary_code_path("Condition"), Some("code"));
        assert_eq!(model.retrievable_types().collect::<Vec<_>>(), vec!["Condition"]);
    }

    #[test]
    fn test_list_type_specifier() {
        let property = PropertyInfo::new("coding", "list<FHIR.Coding>");
        assert!(property.is_list);
        assert_eq!(property.element_type, "FHIR.Coding");
    }
}
