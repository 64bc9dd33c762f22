//! Pattern library: named feature -> ordered list of whole-word matchers.
//!
//! Definitions are data (`patterns/*.toml`), compiled once into an
//! immutable [`PatternLibrary`] that is passed explicitly to every stage.

pub mod library;
pub mod toml_patterns;

pub use library::{FeatureDefinition, PatternLibrary};
pub use toml_patterns::{TomlFeatureDef, TomlFeatureFile, TomlPatternLoader};
