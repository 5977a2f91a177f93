//! Value set expansion
//!
//! Members come either from a realized `expansion.contains` list or, in degraded
//! mode, from the concepts enumerated in `compose.include`.

use crate::code::Code;
use crate::error::TerminologyError;
use crate::settings::{PreExpansionMode, TerminologySettings};
use log::warn;
use octofhir_cqf_diagnostics::{Diagnostic, CQF0304};
use serde_json::Value;
use std::collections::HashSet;

/// The members of one value set
#[derive(Debug, Clone)]
pub struct ValueSetExpansion {
    pub url: String,
    pub version: Option<String>,
    members: Vec<Code>,
    /// indices into `members`, ordered by (code, system)
    by_code: Vec<usize>,
    complete: bool,
}

fn key(code: &Code) -> (Option<&str>, Option<&str>) {
    (code.code.as_deref(), code.system.as_deref())
}

impl ValueSetExpansion {
    /// Build from candidate members. Members without a code are dropped and
    /// duplicates (same system and code) keep their first position.
    pub fn new(
        url: impl Into<String>,
        version: Option<String>,
        candidates: impl IntoIterator<Item = Code>,
        complete: bool,
    ) -> Self {
        let mut seen = HashSet::new();
        let members: Vec<Code> = candidates
            .into_iter()
            .filter(|code| code.code.is_some())
            .filter(|code| seen.insert((code.code.clone(), code.system.clone())))
            .collect();

        let mut by_code: Vec<usize> = (0..members.len()).collect();
        by_code.sort_by(|&a, &b| key(&members[a]).cmp(&key(&members[b])));

        Self {
            url: url.into(),
            version,
            members,
            by_code,
            complete,
        }
    }

    /// Members in declaration order
    pub fn codes(&self) -> &[Code] {
        &self.members
    }

    /// `false` when some part of the definition could not be evaluated offline
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, code: &Code) -> bool {
        if code.code.is_none() {
            return false;
        }
        let wanted = key(code);
        self.by_code
            .binary_search_by(|&i| key(&self.members[i]).cmp(&wanted))
            .is_ok()
    }
}

/// Canonical identity of a ValueSet resource: its `url`, or its `id` when it has none
pub fn value_set_url(resource: &Value) -> Option<&str> {
    resource
        .get("url")
        .and_then(Value::as_str)
        .or_else(|| resource.get("id").and_then(Value::as_str))
}

/// Expand one ValueSet resource according to `settings`.
///
/// Degraded results are reported through `diagnostics` and logged; they are not errors.
pub fn expand_value_set(
    resource: &Value,
    settings: &TerminologySettings,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<ValueSetExpansion, TerminologyError> {
    let url = value_set_url(resource)
        .ok_or_else(|| TerminologyError::InvalidArgument("ValueSet without url or id".to_string()))?
        .to_string();
    let version = resource.get("version").and_then(Value::as_str).map(String::from);
    let expansion = resource.get("expansion").filter(|e| e.is_object());

    let use_expansion = match (settings.pre_expansion, expansion) {
        (PreExpansionMode::Ignore, _) => None,
        (_, Some(expansion)) => Some(expansion),
        (PreExpansionMode::Require, None) => {
            return Err(TerminologyError::ExpansionRequired { url });
        }
        (PreExpansionMode::UseIfPresent, None) => None,
    };

    if let Some(expansion) = use_expansion {
        let mut codes = Vec::new();
        flatten_contains(expansion, &mut codes);

        let naive = is_naive(expansion);
        if naive {
            warn!("Codes for ValueSet {url} were expanded without a terminology server, some results may not be correct");
            diagnostics.push(
                Diagnostic::warning(CQF0304, "expansion was computed without a terminology server")
                    .with_subject(url.clone()),
            );
        }
        return Ok(ValueSetExpansion::new(url, version, codes, !naive));
    }

    if !settings.compose_fallback {
        return Err(TerminologyError::ExpansionFailed {
            url,
            reason: "no usable expansion and compose fallback is disabled".to_string(),
        });
    }

    warn!("ValueSet {url} is not expanded, falling back to its compose definition; results may be incomplete");
    let (codes, complete) = codes_from_compose(resource.get("compose"), &url, diagnostics);
    diagnostics.push(
        Diagnostic::warning(CQF0304, "members derived from compose definition").with_subject(url.clone()),
    );
    Ok(ValueSetExpansion::new(url, version, codes, complete))
}

fn flatten_contains(node: &Value, out: &mut Vec<Code>) {
    for entry in node.get("contains").and_then(Value::as_array).into_iter().flatten() {
        if let Some(code) = Code::from_coding(entry) {
            out.push(code);
        }
        flatten_contains(entry, out);
    }
}

fn is_naive(expansion: &Value) -> bool {
    expansion
        .get("parameter")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .find(|p| p.get("name").and_then(Value::as_str) == Some("naive"))
        .and_then(|p| p.get("valueBoolean"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn has_entries(element: &Value, name: &str) -> bool {
    element
        .get(name)
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

/// Enumerated concepts of `compose.include`, minus enumerated `compose.exclude` concepts.
///
/// Returns `false` as the second element when a rule had to be skipped.
fn codes_from_compose(
    compose: Option<&Value>,
    url: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Vec<Code>, bool) {
    let Some(compose) = compose else {
        return (Vec::new(), true);
    };
    let mut complete = true;
    let mut skipped = |reason: &str| {
        warn!("ValueSet {url}: {reason}, skipped");
        diagnostics.push(Diagnostic::warning(CQF0304, reason.to_string()).with_subject(url.to_string()));
    };

    let mut codes = Vec::new();
    for include in rules(compose, "include") {
        if has_entries(include, "filter") {
            complete = false;
            skipped("include filter cannot be evaluated offline");
        } else if has_entries(include, "valueSet") {
            complete = false;
            skipped("include of another value set cannot be evaluated offline");
        } else if has_entries(include, "concept") {
            codes.extend(concepts(include));
        } else if include.get("system").is_some() {
            complete = false;
            skipped("include of a whole code system cannot be enumerated offline");
        }
    }

    let mut excluded = Vec::new();
    for exclude in rules(compose, "exclude") {
        if has_entries(exclude, "concept") && !has_entries(exclude, "filter") {
            excluded.extend(concepts(exclude));
        } else {
            complete = false;
            skipped("exclude rule cannot be evaluated offline");
        }
    }
    codes.retain(|code| !excluded.iter().any(|e| e.matches(code)));

    (codes, complete)
}

fn rules<'a>(compose: &'a Value, name: &str) -> impl Iterator<Item = &'a Value> {
    compose.get(name).and_then(Value::as_array).into_iter().flatten()
}

fn concepts(rule: &Value) -> impl Iterator<Item = Code> + '_ {
    let system = rule.get("system").and_then(Value::as_str);
    let version = rule.get("version").and_then(Value::as_str);
    rule.get("concept")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(move |concept| {
            let code = concept.get("code").and_then(Value::as_str)?;
            Some(Code {
                code: Some(code.to_string()),
                system: system.map(String::from),
                version: version.map(String::from),
                display: concept.get("display").and_then(Value::as_str).map(String::from),
            })
        })
}
