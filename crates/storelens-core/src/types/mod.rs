//! Record types shared across the pipeline.
//! Store-prefixed identifiers, App/Review/Website records, sentiment labels.

pub mod collections;
pub mod identifiers;
pub mod records;

pub use collections::{FxHashMap, FxHashSet};
pub use identifiers::{AppKey, Store};
pub use records::{AppRecord, ReviewRecord, SentimentLabel, WebsiteText};
