//! Model name aliasing
//!
//! Libraries may refer to a model by its short name; the compiler needs the model URI.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const FHIR_MODEL_URI: &str = "http://hl7.org/fhir";
pub const QDM_MODEL_URI: &str = "urn:healthit-gov:qdm:v5_4";

static MODEL_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("FHIR", FHIR_MODEL_URI),
        ("QUICK", FHIR_MODEL_URI),
        ("QDM", QDM_MODEL_URI),
    ])
});

/// The URI registered for a model alias
pub fn model_uri(alias: &str) -> Option<&'static str> {
    MODEL_ALIASES.get(alias).copied()
}

/// Expand `alias` to its model URI, leaving unknown names (usually URIs already) untouched
pub fn expand_alias(name: &str) -> &str {
    model_uri(name).unwrap_or(name)
}
