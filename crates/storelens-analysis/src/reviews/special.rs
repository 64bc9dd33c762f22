//! Neurodivergence-related ("special") review detector.

use storelens_core::errors::PatternError;
use storelens_core::types::ReviewRecord;

use crate::patterns::PatternLibrary;

/// Flags reviews where any rule of a pattern library fires on `title\nbody`.
///
/// The rules are data; the shipped set lives in `patterns/special.toml`.
#[derive(Debug, Clone)]
pub struct SpecialDetector {
    library: PatternLibrary,
}

impl SpecialDetector {
    pub fn new(library: PatternLibrary) -> Self {
        Self { library }
    }

    pub fn builtin() -> Result<Self, PatternError> {
        Ok(Self::new(PatternLibrary::builtin_special()?))
    }

    pub fn is_special(&self, title: Option<&str>, body: Option<&str>) -> bool {
        let text = format!("{}\n{}", title.unwrap_or(""), body.unwrap_or(""));
        self.library.features().iter().any(|f| f.is_match(&text))
    }

    /// Recompute the flag on every review. Returns how many are special.
    pub fn tag(&self, reviews: &mut [ReviewRecord]) -> usize {
        let mut n = 0;
        for r in reviews.iter_mut() {
            r.special = self.is_special(r.title.as_deref(), r.body.as_deref());
            n += usize::from(r.special);
        }
        n
    }
}
