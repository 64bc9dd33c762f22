//! Review sentiment: text preparation, the lexicon polarity engine,
//! filtering and scoring, per-(app, store, country) aggregation, and the
//! per-app collapse used by the bundle.

pub mod aggregate;
pub mod collapse;
pub mod lexicon;
pub mod scoring;
pub mod text;

pub use aggregate::{aggregate, SentimentAggregate};
pub use collapse::{collapse_by_app, CollapsedSentiment};
pub use lexicon::LexiconEngine;
pub use scoring::{score_reviews, ScoredReview, SentimentFilter};
pub use text::{clean_text, compose_text};
