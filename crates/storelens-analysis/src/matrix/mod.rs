//! Matrix builder: long-form labels -> wide per-app matrices and bundle.

pub mod bundle;
pub mod long;
pub mod pivot;

pub use bundle::{build_bundle, AppSubset, Bundle, BundleRow};
pub use long::{assemble_long, feature_name_from_filename, FeatureFile, FeatureFileRow, LongRow};
pub use pivot::{flatten_flags, FeatureMatrix, MatrixSet};
