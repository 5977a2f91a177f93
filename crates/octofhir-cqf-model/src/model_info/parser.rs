//! ModelInfo parser for XML and JSON formats
//!
//! Parses HL7 ModelInfo files into `ModelInfo` structures. Both the compact form
//! (`<element name="code" type="list<FHIR.Coding>"/>`) and the specifier form used by
//! published model info files (`<elementTypeSpecifier xsi:type="ListTypeSpecifier" .../>`)
//! are accepted.
//! Reference: http://cql.hl7.org/07-physicalrepresentation.html#modelinfo

use super::types::{ModelInfo, PropertyInfo, TypeInfo};
use crate::identifier::VersionedIdentifier;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Error type for ModelInfo parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    AttrError(#[from] quick_xml::events::attributes::AttrError),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid ModelInfo structure: {0}")]
    InvalidStructure(String),
}

const TYPE_TAGS: [&str; 4] = ["typeInfo", "classInfo", "simpleTypeInfo", "profileInfo"];

/// Parse ModelInfo from either format, sniffing the first non-whitespace character
pub fn parse_model_info(content: &str) -> Result<ModelInfo, ParseError> {
    match content.trim_start().chars().next() {
        Some('<') => parse_xml(content),
        Some('{') => parse_json(content),
        _ => Err(ParseError::InvalidStructure(
            "Content is neither XML nor JSON".to_string(),
        )),
    }
}

/// Parse ModelInfo from XML format
pub fn parse_xml(xml_content: &str) -> Result<ModelInfo, ParseError> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut model_info: Option<ModelInfo> = None;
    let mut current_type: Option<TypeInfo> = None;
    let mut current_property: Option<PropertyInfo> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf)?;
        let (start, closes) = match &event {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                close_tag(&name, &mut model_info, &mut current_type, &mut current_property);
                buf.clear();
                continue;
            }
            Event::Eof => break,
            _ => {
                buf.clear();
                continue;
            }
        };
        let tag = local_name(start);
        let attrs = attributes(start)?;

        match tag.as_str() {
            "modelInfo" => {
                let name = attrs.get("name").cloned().ok_or_else(|| {
                    ParseError::InvalidStructure("modelInfo is missing a name".to_string())
                })?;
                let mut info = ModelInfo::new(name, attrs.get("version").cloned());
                info.url = attrs.get("url").cloned();
                info.target_qualifier = attrs.get("targetQualifier").cloned();
                info.patient_class_name = attrs.get("patientClassName").cloned();
                info.patient_birth_date_property_name =
                    attrs.get("patientBirthDatePropertyName").cloned();
                model_info = Some(info);
            }
            "requiredModelInfo" => {
                if let (Some(info), Some(name)) = (model_info.as_mut(), attrs.get("name")) {
                    info.required_models.push(VersionedIdentifier {
                        id: name.clone(),
                        version: attrs.get("version").cloned(),
                    });
                }
            }
            t if TYPE_TAGS.contains(&t) => {
                current_type = Some(type_info_from_attrs(&attrs)?);
            }
            "element" if current_type.is_some() => {
                let name = attrs.get("name").cloned().ok_or_else(|| {
                    ParseError::InvalidStructure("element is missing a name".to_string())
                })?;
                let specifier = attrs
                    .get("elementType")
                    .or_else(|| attrs.get("type"))
                    .map(String::as_str)
                    .unwrap_or("");
                let mut property = PropertyInfo::new(name, specifier);
                property.target = attrs.get("target").cloned();
                current_property = Some(property);
            }
            "elementTypeSpecifier" => {
                if let Some(property) = current_property.as_mut() {
                    if attrs.get("xsi:type").map(String::as_str) == Some("ListTypeSpecifier") {
                        property.is_list = true;
                    }
                    if let Some(element_type) = attrs.get("elementType") {
                        property.element_type = element_type.clone();
                    }
                }
            }
            _ => {}
        }

        if closes {
            close_tag(&tag, &mut model_info, &mut current_type, &mut current_property);
        }
        buf.clear();
    }

    model_info.ok_or_else(|| ParseError::InvalidStructure("No modelInfo element found".to_string()))
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>, ParseError> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        attrs.insert(
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            String::from_utf8_lossy(&attr.value).to_string(),
        );
    }
    Ok(attrs)
}

fn type_info_from_attrs(attrs: &HashMap<String, String>) -> Result<TypeInfo, ParseError> {
    let name = attrs
        .get("name")
        .ok_or_else(|| ParseError::InvalidStructure("typeInfo is missing a name".to_string()))?;

    let mut type_info = TypeInfo::new(name.clone());
    type_info.namespace = attrs.get("namespace").cloned();
    type_info.base_type = attrs.get("baseType").cloned();
    type_info.retrievable = attrs.get("retrievable").map(String::as_str) == Some("true");
    type_info.primary_code_path = attrs.get("primaryCodePath").cloned();
    Ok(type_info)
}

fn close_tag(
    tag: &str,
    model_info: &mut Option<ModelInfo>,
    current_type: &mut Option<TypeInfo>,
    current_property: &mut Option<PropertyInfo>,
) {
    match tag {
        "element" => {
            if let (Some(property), Some(type_info)) = (current_property.take(), current_type.as_mut()) {
                type_info.elements.push(property);
            }
        }
        t if TYPE_TAGS.contains(&t) => {
            if let (Some(type_info), Some(info)) = (current_type.take(), model_info.as_mut()) {
                info.type_infos.insert(type_info.name.clone(), type_info);
            }
        }
        _ => {}
    }
}

/// Parse ModelInfo from JSON format
pub fn parse_json(json_content: &str) -> Result<ModelInfo, ParseError> {
    let json: JsonValue = serde_json::from_str(json_content)?;

    let name = json["name"]
        .as_str()
        .ok_or_else(|| ParseError::InvalidStructure("Missing model name".to_string()))?;
    let mut model_info = ModelInfo::new(name, json["version"].as_str().map(String::from));

    model_info.url = json["url"].as_str().map(String::from);
    model_info.target_qualifier = json["targetQualifier"].as_str().map(String::from);
    model_info.patient_class_name = json["patientClassName"].as_str().map(String::from);
    model_info.patient_birth_date_property_name =
        json["patientBirthDatePropertyName"].as_str().map(String::from);

    for required in as_list(&json["requiredModelInfo"]) {
        if let Some(name) = required["name"].as_str() {
            model_info.required_models.push(VersionedIdentifier {
                id: name.to_string(),
                version: required["version"].as_str().map(String::from),
            });
        }
    }

    for type_json in as_list(&json["typeInfo"]) {
        let type_info = parse_type_info_json(type_json)?;
        model_info.type_infos.insert(type_info.name.clone(), type_info);
    }

    Ok(model_info)
}

/// JSON model info uses either a single object or an array for repeating members
fn as_list(value: &JsonValue) -> Vec<&JsonValue> {
    match value {
        JsonValue::Array(items) => items.iter().collect(),
        JsonValue::Null => Vec::new(),
        other => vec![other],
    }
}

fn parse_type_info_json(json: &JsonValue) -> Result<TypeInfo, ParseError> {
    let mut type_info = TypeInfo::new(
        json["name"]
            .as_str()
            .ok_or_else(|| ParseError::InvalidStructure("Missing type name".to_string()))?,
    );

    type_info.namespace = json["namespace"].as_str().map(String::from);
    type_info.base_type = json["baseType"].as_str().map(String::from);
    type_info.retrievable = json["retrievable"].as_bool().unwrap_or(false);
    type_info.primary_code_path = json["primaryCodePath"].as_str().map(String::from);

    for element in as_list(&json["element"]) {
        let name = element["name"]
            .as_str()
            .ok_or_else(|| ParseError::InvalidStructure("Missing element name".to_string()))?;

        let specifier = &element["elementTypeSpecifier"];
        let mut property = PropertyInfo::new(
            name,
            element["elementType"]
                .as_str()
                .or_else(|| element["type"].as_str())
                .or_else(|| specifier["elementType"].as_str())
                .unwrap_or(""),
        );
        if specifier["type"].as_str() == Some("ListTypeSpecifier") {
            property.is_list = true;
        }
        property.target = element["target"].as_str().map(String::from);
        type_info.elements.push(property);
    }

    Ok(type_info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <modelInfo name="TestModel" version="1.0.0" url="http://test.org">
            <requiredModelInfo name="System" version="1.0.0"/>
            <typeInfo name="Patient" retrievable="true" primaryCodePath="code">
                <element name="id" type="String"/>
                <element name="name" type="list&lt;String&gt;"/>
            </typeInfo>
        </modelInfo>"#;

        let model = parse_xml(xml).unwrap();
        assert_eq!(model.name, "TestModel");
        assert_eq!(model.version.as_deref(), Some("1.0.0"));
        assert_eq!(
            model.required_models,
            vec![VersionedIdentifier::with_version("System", "1.0.0")]
        );

        let patient = model.get_type("Patient").unwrap();
        assert!(patient.retrievable);
        assert_eq!(patient.primary_code_path.as_deref(), Some("code"));
        assert_eq!(patient.elements.len(), 2);
    }

    #[test]
    fn test_parse_namespaced_xml_with_type_specifiers() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <ns4:modelInfo xmlns:ns4="urn:hl7-org:elm-modelinfo:r1"
                       xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                       name="FHIR" version="4.0.1" url="http://hl7.org/fhir" targetQualifier="fhir">
            <ns4:typeInfo xsi:type="ns4:ClassInfo" name="Observation" baseType="FHIR.DomainResource" retrievable="true">
                <ns4:element name="code" elementType="FHIR.CodeableConcept"/>
                <ns4:element name="category">
                    <ns4:elementTypeSpecifier xsi:type="ListTypeSpecifier" elementType="FHIR.CodeableConcept"/>
                </ns4:element>
            </ns4:typeInfo>
        </ns4:modelInfo>"#;

        let model = parse_xml(xml).unwrap();
        assert_eq!(model.target_qualifier.as_deref(), Some("fhir"));

        let observation = model.get_type("Observation").unwrap();
        let category = observation.get_property("category").unwrap();
        assert!(category.is_list);
        assert_eq!(category.element_type, "FHIR.CodeableConcept");
        assert!(!observation.get_property("code").unwrap().is_list);
    }

    #[test]
    fn test_parse_simple_json() {
        let json = r#"{
            "name": "TestModel",
            "version": "1.0.0",
            "url": "http://test.org",
            "requiredModelInfo": {"name": "System", "version": "1.0.0"},
            "typeInfo": [{
                "name": "Patient",
                "retrievable": true,
                "primaryCodePath": "code",
                "element": [
                    {"name": "id", "type": "String"},
                    {"name": "name", "type": "list<String>"}
                ]
            }]
        }"#;

        let model = parse_json(json).unwrap();
        assert_eq!(model.name, "TestModel");
        assert_eq!(model.required_models.len(), 1);

        let name = model.get_property("Patient", "name").unwrap();
        assert!(name.is_list);
        assert_eq!(name.element_type, "String");
    }

    #[test]
    fn test_parse_sniffs_format() {
        assert!(parse_model_info(r#"{"name": "M"}"#).is_ok());
        assert!(parse_model_info(r#"<modelInfo name="M"/>"#).is_ok());
        assert!(matches!(parse_model_info("name: M"), Err(ParseError::InvalidStructure(_))));
    }

    #[test]
    fn test_missing_model_element_is_an_error() {
        let err = parse_xml("<other/>").unwrap_err();
        assert!(matches!(err, ParseError::InvalidStructure(_)));
    }
}
