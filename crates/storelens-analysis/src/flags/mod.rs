//! Feature flag driver: apps x features -> labeled rows.

pub mod driver;
pub mod types;

pub use driver::FeatureFlagDriver;
pub use types::{FeatureLabel, FlagRun};
