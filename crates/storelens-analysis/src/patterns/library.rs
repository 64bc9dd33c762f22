//! Immutable, compiled feature library.

use std::path::Path;

use regex::{Regex, RegexSet};
use rustc_hash::FxHashMap;

use storelens_core::errors::PatternError;

use super::toml_patterns::TomlPatternLoader;

const BUILTIN_FEATURES: &str = include_str!("../../patterns/features.toml");
const BUILTIN_SPECIAL: &str = include_str!("../../patterns/special.toml");

/// One named feature and its matchers.
///
/// A text "hits" the feature when any matcher fires anywhere in it.
#[derive(Debug, Clone)]
pub struct FeatureDefinition {
    name: String,
    tier: Option<String>,
    description: Option<String>,
    matchers: Vec<Regex>,
    set: RegexSet,
}

impl FeatureDefinition {
    pub(crate) fn new(
        name: String,
        tier: Option<String>,
        description: Option<String>,
        matchers: Vec<Regex>,
        set: RegexSet,
    ) -> Self {
        Self {
            name,
            tier,
            description,
            matchers,
            set,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Matchers in definition order.
    pub fn matchers(&self) -> &[Regex] {
        &self.matchers
    }

    /// True if any matcher fires. Empty text never matches.
    pub fn is_match(&self, text: &str) -> bool {
        !text.is_empty() && self.set.is_match(text)
    }
}

/// Feature name -> compiled matchers, in definition order.
///
/// Constructed once at startup and shared by reference; there is no global
/// registry.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    features: Vec<FeatureDefinition>,
    index: FxHashMap<String, usize>,
}

impl PatternLibrary {
    /// Build from already-compiled definitions. Duplicate names are rejected.
    pub fn new(features: Vec<FeatureDefinition>) -> Result<Self, PatternError> {
        let mut index = FxHashMap::default();
        for (i, f) in features.iter().enumerate() {
            if index.insert(f.name.clone(), i).is_some() {
                return Err(PatternError::InvalidDefinition(format!(
                    "duplicate feature '{}'",
                    f.name
                )));
            }
        }
        Ok(Self { features, index })
    }

    /// The shipped feature library (20 features).
    pub fn builtin() -> Result<Self, PatternError> {
        Self::from_toml_str(BUILTIN_FEATURES)
    }

    /// The shipped neurodivergence detector, a one-feature library.
    pub fn builtin_special() -> Result<Self, PatternError> {
        Self::from_toml_str(BUILTIN_SPECIAL)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, PatternError> {
        Self::new(TomlPatternLoader::load_from_str(toml_str)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, PatternError> {
        Self::new(TomlPatternLoader::load_from_file(path)?)
    }

    /// Built-in library, or the file at `path` when one is configured.
    pub fn load(path: Option<&Path>) -> Result<Self, PatternError> {
        match path {
            Some(p) => {
                tracing::info!(path = %p.display(), "loading feature patterns");
                Self::from_file(p)
            }
            None => Self::builtin(),
        }
    }

    pub fn feature(&self, name: &str) -> Option<&FeatureDefinition> {
        self.index.get(name).map(|&i| &self.features[i])
    }

    /// Like [`feature`](Self::feature), but an unknown name is an error
    /// listing the valid names.
    pub fn require(&self, name: &str) -> Result<&FeatureDefinition, PatternError> {
        self.feature(name).ok_or_else(|| {
            let mut valid: Vec<&str> = self.names().collect();
            valid.sort_unstable();
            PatternError::UnknownFeature {
                name: name.to_string(),
                valid: valid.join(", "),
            }
        })
    }

    /// Ordered matchers for `name`.
    pub fn patterns(&self, name: &str) -> Result<&[Regex], PatternError> {
        self.require(name).map(FeatureDefinition::matchers)
    }

    pub fn features(&self) -> &[FeatureDefinition] {
        &self.features
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
