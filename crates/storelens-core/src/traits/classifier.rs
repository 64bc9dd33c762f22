//! LLM feature-classification seam.

use crate::types::AppKey;

/// What a classifier sees for one app.
#[derive(Debug, Clone)]
pub struct ClassifierRequest<'a> {
    pub app_key: &'a AppKey,
    pub title: &'a str,
    /// Rendered prompt carrying the app's description and website text.
    pub text: &'a str,
    /// Feature names the classifier may answer with.
    pub taxonomy: &'a [String],
}

/// Given text and a taxonomy, return the raw model response.
///
/// The response is parsed by the tagged-variant parser in
/// `storelens-analysis::llm`, so implementations only move bytes.
pub trait FeatureClassifier {
    fn vendor(&self) -> &str;

    fn model(&self) -> &str;

    /// One call. An `Err` is retried up to the configured attempt budget.
    fn classify(&self, request: &ClassifierRequest<'_>) -> Result<String, String>;
}
