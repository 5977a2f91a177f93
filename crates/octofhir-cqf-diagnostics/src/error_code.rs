//! Error codes following a structured numbering system
//!
//! Error code ranges:
//! - CQF0001-CQF0099: Not found (model, library, value set, resource)
//! - CQF0100-CQF0199: Conflicts and invalid arguments
//! - CQF0200-CQF0299: Contract violations by collaborators (retrieve backends, loaders)
//! - CQF0300-CQF0399: Content errors (model info, value set, library content)
//! - CQF0400-CQF0499: System errors (I/O, configuration)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    pub const fn is_not_found(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    pub const fn is_conflict(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    pub const fn is_contract_violation(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_content_error(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    pub const fn is_system_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Status class reported at a REST boundary.
    ///
    /// Lookups that fail and conflicting requests are the caller's problem; a
    /// collaborator breaking its contract or a system failure is ours.
    pub const fn status_class(&self) -> StatusClass {
        if self.is_not_found() || self.is_conflict() || self.is_content_error() {
            StatusClass::ClientError
        } else {
            StatusClass::ServerError
        }
    }

    /// HTTP status code suggested for this error
    pub const fn http_status(&self) -> u16 {
        if self.is_not_found() {
            404
        } else if self.0 == CQF0100.0 {
            409
        } else if self.is_conflict() || self.is_content_error() {
            400
        } else {
            500
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CQF{:04}", self.0)
    }
}

/// Coarse classification of an error for the outer REST layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    /// 4xx: the request named something that does not exist or cannot be honoured
    ClientError,
    /// 5xx: a backend or the host misbehaved
    ServerError,
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Not found (0001-0099)
    map.insert(1, ErrorInfo::new("Model not found"));
    map.insert(2, ErrorInfo::new("Library not found"));
    map.insert(3, ErrorInfo::new("Value set not found")
        .with_help("Check that the value set is present in the terminology bundle or repository"));
    map.insert(4, ErrorInfo::new("Resource not found"));
    map.insert(5, ErrorInfo::new("Unsupported FHIR version"));
    map.insert(6, ErrorInfo::new("No provider factory for endpoint type"));

    // Conflicts and invalid arguments (0100-0199)
    map.insert(100, ErrorInfo::new("Model version conflict")
        .with_help("A single evaluation may only use one version of each model"));
    map.insert(101, ErrorInfo::new("Invalid argument"));
    map.insert(102, ErrorInfo::new("Invalid version"));
    map.insert(103, ErrorInfo::new("Invalid path"));
    map.insert(104, ErrorInfo::new("Ambiguous resource"));
    map.insert(105, ErrorInfo::new("Unknown endpoint connection type"));

    // Contract violations (0200-0299)
    map.insert(200, ErrorInfo::new("Retrieve provider returned no result")
        .with_help("Providers must return an empty list when they have no data"));
    map.insert(201, ErrorInfo::new("Terminology provider unavailable"));
    map.insert(202, ErrorInfo::new("Library compilation failed"));
    map.insert(203, ErrorInfo::new("Backend failure"));

    // Content errors (0300-0399)
    map.insert(300, ErrorInfo::new("ModelInfo parse failed"));
    map.insert(301, ErrorInfo::new("Invalid bundle"));
    map.insert(302, ErrorInfo::new("Value set expansion required"));
    map.insert(303, ErrorInfo::new("Value set expansion failed"));
    map.insert(304, ErrorInfo::new("Value set expansion incomplete"));
    map.insert(305, ErrorInfo::new("Invalid library content"));

    // System errors (0400-0499)
    map.insert(400, ErrorInfo::new("Internal error"));
    map.insert(401, ErrorInfo::new("I/O error"));
    map.insert(402, ErrorInfo::new("Configuration error"));

    map
});

// Not found
pub const CQF0001: ErrorCode = ErrorCode::new(1);
pub const CQF0002: ErrorCode = ErrorCode::new(2);
pub const CQF0003: ErrorCode = ErrorCode::new(3);
pub const CQF0004: ErrorCode = ErrorCode::new(4);
pub const CQF0005: ErrorCode = ErrorCode::new(5);
pub const CQF0006: ErrorCode = ErrorCode::new(6);

// Conflicts and invalid arguments
pub const CQF0100: ErrorCode = ErrorCode::new(100);
pub const CQF0101: ErrorCode = ErrorCode::new(101);
pub const CQF0102: ErrorCode = ErrorCode::new(102);
pub const CQF0103: ErrorCode = ErrorCode::new(103);
pub const CQF0104: ErrorCode = ErrorCode::new(104);
pub const CQF0105: ErrorCode = ErrorCode::new(105);

// Contract violations
pub const CQF0200: ErrorCode = ErrorCode::new(200);
pub const CQF0201: ErrorCode = ErrorCode::new(201);
pub const CQF0202: ErrorCode = ErrorCode::new(202);
pub const CQF0203: ErrorCode = ErrorCode::new(203);

// Content errors
pub const CQF0300: ErrorCode = ErrorCode::new(300);
pub const CQF0301: ErrorCode = ErrorCode::new(301);
pub const CQF0302: ErrorCode = ErrorCode::new(302);
pub const CQF0303: ErrorCode = ErrorCode::new(303);
pub const CQF0304: ErrorCode = ErrorCode::new(304);
pub const CQF0305: ErrorCode = ErrorCode::new(305);

// System errors
pub const CQF0400: ErrorCode = ErrorCode::new(400);
pub const CQF0401: ErrorCode = ErrorCode::new(401);
pub const CQF0402: ErrorCode = ErrorCode::new(402);
