//! Search parameters
//!
//! Deliberately small: each parameter is matched exactly against the top-level
//! field of the same name (`_id` maps to `id`). Several values for one parameter
//! are OR-ed, distinct parameters are AND-ed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub parameters: IndexMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl SearchParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.parameters.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Whether `resource` satisfies every parameter
    pub fn matches(&self, resource: &Value) -> bool {
        self.parameters.iter().all(|(key, values)| {
            let field = if key == "_id" { "id" } else { key.as_str() };
            match resource.get(field) {
                Some(Value::String(actual)) => values.iter().any(|v| v == actual),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|actual| values.iter().any(|v| v == actual)),
                Some(Value::Bool(actual)) => values.iter().any(|v| v == &actual.to_string()),
                _ => false,
            }
        })
    }
}
