//! Evidence source labels.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A text channel scanned for pattern matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Title,
    Description,
    Website,
    Metadata,
}

impl Source {
    /// Scan order, also the order sources appear in `signals`.
    pub const ALL: [Source; 4] = [
        Source::Title,
        Source::Description,
        Source::Website,
        Source::Metadata,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Website => "website",
            Self::Metadata => "metadata",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "title" => Some(Self::Title),
            "description" => Some(Self::Description),
            "website" => Some(Self::Website),
            "metadata" => Some(Self::Metadata),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Distinct matched sources in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSet(SmallVec<[Source; 4]>);

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping scan order; duplicates are ignored.
    pub fn insert(&mut self, source: Source) {
        if let Err(pos) = self.0.binary_search(&source) {
            self.0.insert(pos, source);
        }
    }

    pub fn contains(&self, source: Source) -> bool {
        self.0.contains(&source)
    }

    /// Number of distinct sources.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Source> + '_ {
        self.0.iter().copied()
    }

    /// Comma-joined names, e.g. `title,description`.
    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(Source::name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<Source> for SourceSet {
    fn from_iter<I: IntoIterator<Item = Source>>(iter: I) -> Self {
        let mut set = Self::new();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_set_dedups_and_orders() {
        let set: SourceSet = [Source::Website, Source::Title, Source::Website]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.joined(), "title,website");
    }
}
