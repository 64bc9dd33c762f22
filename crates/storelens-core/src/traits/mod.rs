//! Seam traits for pluggable collaborators.

pub mod classifier;
pub mod polarity;

pub use classifier::{ClassifierRequest, FeatureClassifier};
pub use polarity::{PolarityEngine, PolarityScore};
