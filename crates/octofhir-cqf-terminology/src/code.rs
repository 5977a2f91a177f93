//! Codes and terminology references

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A terminology code. Either field may be absent on data coming from resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Code {
    pub code: Option<String>,
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Code {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            system: Some(system.into()),
            ..Self::default()
        }
    }

    /// A code without a system
    pub fn bare(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Read a FHIR `Coding` (or an expansion `contains` entry)
    pub fn from_coding(coding: &Value) -> Option<Self> {
        let object = coding.as_object()?;
        let field = |name: &str| object.get(name).and_then(Value::as_str).map(String::from);
        let code = Self {
            code: field("code"),
            system: field("system"),
            version: field("version"),
            display: field("display"),
        };
        (code.code.is_some() || code.system.is_some()).then_some(code)
    }

    /// Every code carried by a `Coding`, `CodeableConcept` or a list of either
    pub fn from_element(element: &Value) -> Vec<Self> {
        match element {
            Value::Array(items) => items.iter().flat_map(Self::from_element).collect(),
            Value::Object(object) => match object.get("coding") {
                Some(codings) => Self::from_element(codings),
                None => Self::from_coding(element).into_iter().collect(),
            },
            _ => Vec::new(),
        }
    }

    /// Match on code and system. A code that is absent never matches; absent systems
    /// only match each other.
    pub fn matches(&self, other: &Code) -> bool {
        self.code.is_some() && self.code == other.code && self.system == other.system
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.system {
            Some(system) => write!(f, "{}|{}", system, self.code.as_deref().unwrap_or("")),
            None => f.write_str(self.code.as_deref().unwrap_or("")),
        }
    }
}

/// Reference to a value set by canonical URL (or id) and optional version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueSetInfo {
    pub id: String,
    pub version: Option<String>,
    #[serde(default)]
    pub code_systems: Vec<CodeSystemInfo>,
}

impl ValueSetInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
            code_systems: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// `url` or `url|version`
    pub fn canonical(&self) -> String {
        match &self.version {
            Some(version) => format!("{}|{}", self.id, version),
            None => self.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeSystemInfo {
    pub id: String,
    pub version: Option<String>,
}

impl CodeSystemInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
        }
    }
}
