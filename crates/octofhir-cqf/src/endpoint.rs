//! Endpoint classification
//!
//! Data, terminology and library sources are described by FHIR `Endpoint`s. The
//! connection type decides which kind of provider serves an endpoint; when it is
//! missing, the address decides.

use log::debug;
use octofhir_cqf_diagnostics::{ErrorCode, CQF0006, CQF0101, CQF0105};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointType {
    /// A FHIR REST server
    FhirRest,
    /// A directory or file of FHIR resources
    FhirFiles,
    /// A `.cql` file or a directory of them
    CqlFiles,
}

impl EndpointType {
    pub const ALL: [EndpointType; 3] = [Self::FhirRest, Self::FhirFiles, Self::CqlFiles];

    /// Code in the `endpoint-connection-type` code system
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FhirRest => "hl7-fhir-rest",
            Self::FhirFiles => "hl7-fhir-files",
            Self::CqlFiles => "hl7-cql-files",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|endpoint_type| endpoint_type.code() == code)
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum EndpointError {
    #[error("Unknown endpoint connection type: {code}")]
    UnknownConnectionType { code: String },

    #[error("No provider factory registered for {endpoint_type} endpoints")]
    NoFactory { endpoint_type: EndpointType },

    #[error("Invalid Endpoint resource: {message}")]
    InvalidEndpoint { message: String },
}

impl EndpointError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownConnectionType { .. } => CQF0105,
            Self::NoFactory { .. } => CQF0006,
            Self::InvalidEndpoint { .. } => CQF0101,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub address: String,
    pub connection_type: Option<String>,
    #[serde(default)]
    pub headers: Vec<String>,
}

impl EndpointInfo {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_connection_type(mut self, endpoint_type: EndpointType) -> Self {
        self.connection_type = Some(endpoint_type.code().to_string());
        self
    }

    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    /// Read `address`, `connectionType.code` and `header` from an Endpoint resource
    pub fn from_resource(endpoint: &Value) -> Result<Self, EndpointError> {
        if endpoint.get("resourceType").and_then(Value::as_str) != Some("Endpoint") {
            return Err(EndpointError::InvalidEndpoint {
                message: "resourceType is not Endpoint".to_string(),
            });
        }
        let address = endpoint
            .get("address")
            .and_then(Value::as_str)
            .ok_or_else(|| EndpointError::InvalidEndpoint {
                message: "Endpoint has no address".to_string(),
            })?;

        let connection_type = endpoint
            .pointer("/connectionType/code")
            .and_then(Value::as_str)
            .map(str::to_string);
        let headers = endpoint
            .get("header")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();

        Ok(Self {
            address: address.to_string(),
            connection_type,
            headers,
        })
    }
}

/// Decide which kind of provider serves `endpoint`
pub fn classify(endpoint: &EndpointInfo) -> Result<EndpointType, EndpointError> {
    if let Some(code) = endpoint.connection_type.as_deref() {
        return EndpointType::from_code(code).ok_or_else(|| EndpointError::UnknownConnectionType {
            code: code.to_string(),
        });
    }

    let address = endpoint.address.as_str();
    if address.starts_with("http://") || address.starts_with("https://") {
        return Ok(EndpointType::FhirRest);
    }

    let path = Path::new(address.strip_prefix("file://").unwrap_or(address));
    if is_cql_file(path) || contains_cql_files(path) {
        Ok(EndpointType::CqlFiles)
    } else {
        Ok(EndpointType::FhirFiles)
    }
}

fn is_cql_file(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == "cql")
}

fn contains_cql_files(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|entries| entries.flatten().any(|entry| is_cql_file(&entry.path())))
        .unwrap_or(false)
}

type ProviderFactory<P> = Box<dyn Fn(&EndpointInfo) -> P + Send + Sync>;

/// Factories producing providers of type `P`, one per endpoint type
pub struct ProviderFactoryRegistry<P> {
    factories: HashMap<EndpointType, ProviderFactory<P>>,
}

impl<P> Default for ProviderFactoryRegistry<P> {
    fn default() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }
}

impl<P> ProviderFactoryRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for `endpoint_type`, replacing any previous one
    pub fn register<F>(&mut self, endpoint_type: EndpointType, factory: F)
    where
        F: Fn(&EndpointInfo) -> P + Send + Sync + 'static,
    {
        self.factories.insert(endpoint_type, Box::new(factory));
    }

    pub fn supports(&self, endpoint_type: EndpointType) -> bool {
        self.factories.contains_key(&endpoint_type)
    }

    /// Classify `endpoint` and build a provider for it
    pub fn create(&self, endpoint: &EndpointInfo) -> Result<P, EndpointError> {
        let endpoint_type = classify(endpoint)?;
        let factory = self
            .factories
            .get(&endpoint_type)
            .ok_or(EndpointError::NoFactory { endpoint_type })?;
        debug!("Creating {endpoint_type} provider for {}", endpoint.address);
        Ok(factory(endpoint))
    }
}
