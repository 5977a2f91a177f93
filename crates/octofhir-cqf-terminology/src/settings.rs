//! Terminology settings

use serde::{Deserialize, Serialize};

/// How pre-computed `ValueSet.expansion` content is used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreExpansionMode {
    /// Use the expansion when there is one, otherwise derive members from `compose`
    #[default]
    UseIfPresent,
    /// A value set without an expansion cannot be used
    Require,
    /// Always derive members from `compose`
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminologySettings {
    #[serde(default)]
    pub pre_expansion: PreExpansionMode,

    /// Derive members from `compose` when no expansion is used
    #[serde(default = "default_compose_fallback")]
    pub compose_fallback: bool,
}

fn default_compose_fallback() -> bool {
    true
}

impl Default for TerminologySettings {
    fn default() -> Self {
        Self {
            pre_expansion: PreExpansionMode::default(),
            compose_fallback: default_compose_fallback(),
        }
    }
}

impl TerminologySettings {
    #[must_use]
    pub fn with_pre_expansion(mut self, mode: PreExpansionMode) -> Self {
        self.pre_expansion = mode;
        self
    }

    #[must_use]
    pub fn with_compose_fallback(mut self, enabled: bool) -> Self {
        self.compose_fallback = enabled;
        self
    }
}
