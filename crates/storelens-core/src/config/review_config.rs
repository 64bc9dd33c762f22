//! Review deduplication configuration.

use serde::{Deserialize, Serialize};

/// Key space of the content-hash dedup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DedupeScope {
    /// One copy per (app_key, hash) across all countries.
    #[default]
    Global,
    /// One copy per (app_key, country, hash).
    Country,
}

impl DedupeScope {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "global" => Some(Self::Global),
            "country" => Some(Self::Country),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReviewConfig {
    /// Default: global.
    pub dedupe_scope: Option<DedupeScope>,
}

impl ReviewConfig {
    pub fn effective_dedupe_scope(&self) -> DedupeScope {
        self.dedupe_scope.unwrap_or_default()
    }
}
