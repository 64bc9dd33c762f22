//! Per-app evidence collection over title, description, website, metadata.

use storelens_core::types::AppRecord;

use super::types::{Source, SourceSet};
use crate::patterns::FeatureDefinition;

/// The four scanned channels of one app, prepared once and reused across
/// features. Missing fields are empty strings and never match.
#[derive(Debug, Clone, Default)]
pub struct EvidenceText<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub website: &'a str,
    /// Category and developer joined with a space.
    pub metadata: String,
}

impl<'a> EvidenceText<'a> {
    pub fn from_app(app: &'a AppRecord, website_text: Option<&'a str>) -> Self {
        Self {
            title: app.title.as_deref().unwrap_or(""),
            description: app.description.as_deref().unwrap_or(""),
            website: website_text.unwrap_or(""),
            metadata: app.metadata_text(),
        }
    }

    fn channel(&self, source: Source) -> &str {
        match source {
            Source::Title => self.title,
            Source::Description => self.description,
            Source::Website => self.website,
            Source::Metadata => &self.metadata,
        }
    }
}

/// Sources whose text hits `feature`. Stateless and deterministic.
pub fn collect(text: &EvidenceText<'_>, feature: &FeatureDefinition) -> SourceSet {
    Source::ALL
        .into_iter()
        .filter(|&s| feature.is_match(text.channel(s)))
        .collect()
}
