//! App table stages: raw dump normalization, relevance scoring, cleaning.

pub mod clean;
pub mod fields;
pub mod normalize;
pub mod relevance;

pub use clean::{clean_apps, CleanOutcome, CleaningPolicy, DropReason, DroppedApp};
pub use fields::{parse_int_from_human, parse_price_range, to_iso_date, RawRecord};
pub use normalize::{normalize_record, normalize_records, resolve_record, slugify};
pub use relevance::{RelevanceScorer, RelevanceTerms};
