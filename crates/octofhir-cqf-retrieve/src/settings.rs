//! Retrieve settings

use serde::{Deserialize, Serialize};

/// How a retrieve's template id (profile) restricts results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileMode {
    /// Template ids are ignored
    Off,
    /// Resources must declare the profile in `meta.profile`
    #[default]
    Declared,
    /// Resources declaring no profile at all are also kept
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveSettings {
    #[serde(default)]
    pub profile_mode: ProfileMode,

    #[serde(default = "default_filter_by_context")]
    pub filter_by_context: bool,
}

fn default_filter_by_context() -> bool {
    true
}

impl Default for RetrieveSettings {
    fn default() -> Self {
        Self {
            profile_mode: ProfileMode::default(),
            filter_by_context: default_filter_by_context(),
        }
    }
}

impl RetrieveSettings {
    #[must_use]
    pub fn with_profile_mode(mut self, mode: ProfileMode) -> Self {
        self.profile_mode = mode;
        self
    }
}
