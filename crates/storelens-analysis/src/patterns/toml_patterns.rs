//! Declarative TOML feature definitions, user-extensible without recompiling.

use std::path::Path;

use regex::{RegexBuilder, RegexSetBuilder};
use serde::{Deserialize, Serialize};

use storelens_core::errors::PatternError;

use super::library::FeatureDefinition;

/// A TOML-defined feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlFeatureDef {
    pub name: String,
    pub tier: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// A collection of TOML feature definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlFeatureFile {
    #[serde(default)]
    pub features: Vec<TomlFeatureDef>,
}

/// Loader for TOML feature definitions.
pub struct TomlPatternLoader;

impl TomlPatternLoader {
    /// Load and compile features from a TOML string, in file order.
    pub fn load_from_str(toml_str: &str) -> Result<Vec<FeatureDefinition>, PatternError> {
        let file: TomlFeatureFile = toml::from_str(toml_str)
            .map_err(|e| PatternError::InvalidDefinition(format!("TOML parse error: {e}")))?;

        let mut features = Vec::with_capacity(file.features.len());
        for def in file.features {
            if def.enabled == Some(false) {
                continue;
            }
            features.push(Self::compile(def)?);
        }
        Ok(features)
    }

    /// Load features from a file path.
    pub fn load_from_file(path: &Path) -> Result<Vec<FeatureDefinition>, PatternError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PatternError::InvalidDefinition(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::load_from_str(&content)
    }

    /// Compile one definition. Every matcher is case-insensitive.
    fn compile(def: TomlFeatureDef) -> Result<FeatureDefinition, PatternError> {
        let name = def.name.trim().to_string();
        if name.is_empty() {
            return Err(PatternError::InvalidDefinition(
                "feature with empty name".to_string(),
            ));
        }

        let mut matchers = Vec::with_capacity(def.patterns.len());
        for pattern in &def.patterns {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| PatternError::CompilationFailed {
                    feature: name.clone(),
                    message: e.to_string(),
                })?;
            matchers.push(regex);
        }

        let set = RegexSetBuilder::new(&def.patterns)
            .case_insensitive(true)
            .build()
            .map_err(|e| PatternError::CompilationFailed {
                feature: name.clone(),
                message: e.to_string(),
            })?;

        Ok(FeatureDefinition::new(name, def.tier, def.description, matchers, set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_features_skipped() {
        let defs = TomlPatternLoader::load_from_str(
            r#"
[[features]]
name = "a"
patterns = ['\bfoo\b']

[[features]]
name = "b"
enabled = false
patterns = ['\bbar\b']
"#,
        )
        .unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name(), "a");
    }

    #[test]
    fn test_bad_regex_names_feature() {
        let err = TomlPatternLoader::load_from_str(
            "[[features]]\nname = \"broken\"\npatterns = ['(unclosed']\n",
        )
        .unwrap_err();
        match err {
            PatternError::CompilationFailed { feature, .. } => assert_eq!(feature, "broken"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlPatternLoader::load_from_str("[[features]\n"),
            Err(PatternError::InvalidDefinition(_))
        ));
    }
}
