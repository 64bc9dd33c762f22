//! LLM classification driver configuration.
//!
//! Vendor API keys are never read from files; see [`LlmConfig::api_key`].

use serde::{Deserialize, Serialize};

use crate::constants;

/// Which answer shape the classification prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Feature names with Goldilocks support labels.
    #[default]
    Goldilocks,
    /// A present/absent flag with confidence for every taxonomy feature.
    Presence,
}

impl PromptStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "goldilocks" => Some(Self::Goldilocks),
            "presence" => Some(Self::Presence),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Attempts per app before recording a failure. Default: 3.
    pub max_attempts: Option<u32>,
    /// Delay between calls in milliseconds. Default: 600.
    pub sleep_ms: Option<u64>,
    /// Skip app_keys already present in the output. Default: false.
    pub resume: Option<bool>,
    /// Per-call time budget in milliseconds. Default: 180000.
    pub timeout_ms: Option<u64>,
    /// Default: goldilocks.
    pub prompt: Option<PromptStyle>,
}

impl LlmConfig {
    pub fn effective_max_attempts(&self) -> u32 {
        self.max_attempts
            .unwrap_or(constants::DEFAULT_MAX_ATTEMPTS)
            .max(1)
    }

    pub fn effective_sleep_ms(&self) -> u64 {
        self.sleep_ms.unwrap_or(constants::DEFAULT_SLEEP_MS)
    }

    pub fn effective_resume(&self) -> bool {
        self.resume.unwrap_or(false)
    }

    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(constants::DEFAULT_TIMEOUT_MS).max(1)
    }

    pub fn effective_prompt(&self) -> PromptStyle {
        self.prompt.unwrap_or_default()
    }

    /// Environment variables holding the key for `vendor`, in lookup order.
    pub fn key_vars(vendor: &str) -> &'static [&'static str] {
        match vendor.to_lowercase().as_str() {
            "openai" => &["OPENAI_API_KEY"],
            "gemini" | "google" => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
            _ => &[],
        }
    }

    /// First non-empty key for `vendor`, or `None` when the vendor should be skipped.
    pub fn api_key(vendor: &str) -> Option<String> {
        Self::key_vars(vendor)
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty())
    }
}
