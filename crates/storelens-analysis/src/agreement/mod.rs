//! Multi-rater reconciliation. Read-only over rater labels; never feeds
//! back into the matrices.

pub mod kappa;
pub mod raters;

pub use kappa::{agreement, cohen_kappa, KappaStats, PairAgreement};
pub use raters::{RaterLabel, RaterTable};
