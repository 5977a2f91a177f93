//! Retrieve request

use octofhir_cqf_terminology::Code;
use serde::{Deserialize, Serialize};

/// Date bounds as ISO-8601 strings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub low: Option<String>,
    pub high: Option<String>,
}

impl DateRange {
    pub fn new(low: Option<String>, high: Option<String>) -> Self {
        Self { low, high }
    }
}

/// The arguments of one CQL Retrieve
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveRequest {
    /// Evaluation context type, e.g. `Patient`
    pub context: Option<String>,
    /// Path on the retrieved type relating it to the context
    pub context_path: Option<String>,
    pub context_value: Option<String>,
    pub data_type: String,
    pub template_id: Option<String>,
    pub code_path: Option<String>,
    pub codes: Option<Vec<Code>>,
    pub value_set: Option<String>,
    pub date_path: Option<String>,
    pub date_low_path: Option<String>,
    pub date_high_path: Option<String>,
    pub date_range: Option<DateRange>,
}

impl RetrieveRequest {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_context(
        mut self,
        context: impl Into<String>,
        context_path: Option<&str>,
        context_value: impl Into<String>,
    ) -> Self {
        self.context = Some(context.into());
        self.context_path = context_path.map(String::from);
        self.context_value = Some(context_value.into());
        self
    }

    #[must_use]
    pub fn with_template(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    #[must_use]
    pub fn with_codes(mut self, code_path: impl Into<String>, codes: Vec<Code>) -> Self {
        self.code_path = Some(code_path.into());
        self.codes = Some(codes);
        self
    }

    #[must_use]
    pub fn with_value_set(mut self, code_path: impl Into<String>, value_set: impl Into<String>) -> Self {
        self.code_path = Some(code_path.into());
        self.value_set = Some(value_set.into());
        self
    }

    #[must_use]
    pub fn with_date(mut self, date_path: impl Into<String>, range: DateRange) -> Self {
        self.date_path = Some(date_path.into());
        self.date_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_date_bounds(
        mut self,
        low_path: impl Into<String>,
        high_path: impl Into<String>,
        range: DateRange,
    ) -> Self {
        self.date_low_path = Some(low_path.into());
        self.date_high_path = Some(high_path.into());
        self.date_range = Some(range);
        self
    }
}
