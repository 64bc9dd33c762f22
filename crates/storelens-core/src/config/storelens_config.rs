//! Top-level storelens configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    CleaningConfig, DedupeScope, LlmConfig, MatrixConfig, PromptStyle, ReviewConfig,
    ScoringConfig, SentimentConfig, SentimentWeighting,
};
use crate::errors::ConfigError;

/// Project config file name, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "storelens.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`STORELENS_*`)
/// 3. Project config (`storelens.toml`, or the file given by `--config`)
/// 4. User config (`~/.storelens/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorelensConfig {
    pub scoring: ScoringConfig,
    pub matrix: MatrixConfig,
    pub sentiment: SentimentConfig,
    pub reviews: ReviewConfig,
    pub cleaning: CleaningConfig,
    pub llm: LlmConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub patterns_path: Option<String>,
    pub min_confidence: Option<f64>,
    pub min_review_hits: Option<u32>,
    pub sentiment_weighting: Option<SentimentWeighting>,
    pub since_days: Option<u32>,
    pub min_words: Option<usize>,
    pub min_chars: Option<usize>,
    pub special_only: Option<bool>,
    pub drop_neutrals_for_agg: Option<bool>,
    pub dedupe_scope: Option<DedupeScope>,
    pub min_rating_count: Option<u64>,
    pub min_play_installs: Option<u64>,
    pub min_cws_users: Option<u64>,
    pub min_relevance: Option<f64>,
    pub max_attempts: Option<u32>,
    pub sleep_ms: Option<u64>,
    pub resume: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub prompt: Option<PromptStyle>,
}

impl StorelensConfig {
    /// Load configuration with 4-layer resolution rooted at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        Self::load_with_file(root, None, cli_overrides)
    }

    /// Like [`load`](Self::load), but an explicit `config_file` replaces the
    /// project layer. An explicit file that does not exist is an error.
    pub fn load_with_file(
        root: &Path,
        config_file: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        ::tracing::warn!(error = %e, "ignoring unreadable user config");
                    }
                }
            }
        }

        // Layer 3: project config
        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::merge_toml_file(&mut config, path)?;
            }
            None => {
                let project_config_path = root.join(PROJECT_CONFIG_FILE);
                if project_config_path.exists() {
                    Self::merge_toml_file(&mut config, &project_config_path)?;
                }
            }
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config);

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &StorelensConfig) -> Result<(), ConfigError> {
        let s = &config.scoring;
        let confidences = [
            ("scoring.multi_source_confidence", s.multi_source_confidence),
            ("scoring.corroborated_confidence", s.corroborated_confidence),
            ("scoring.single_source_confidence", s.single_source_confidence),
            ("scoring.reviews_only_confidence", s.reviews_only_confidence),
            ("matrix.min_confidence", config.matrix.min_confidence),
            ("cleaning.min_relevance", config.cleaning.min_relevance),
        ];
        for (field, value) in confidences {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::ValidationFailed {
                        field: field.to_string(),
                        message: "must be between 0.0 and 1.0".to_string(),
                    });
                }
            }
        }

        let positive_counts = [
            ("scoring.min_sources_for_multi", s.min_sources_for_multi),
            ("scoring.corroboration_review_hits", s.corroboration_review_hits),
            ("scoring.reviews_only_review_hits", s.reviews_only_review_hits),
            ("llm.max_attempts", config.llm.max_attempts),
        ];
        for (field, value) in positive_counts {
            if value == Some(0) {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if config.llm.timeout_ms == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "llm.timeout_ms".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        let pos = config.sentiment.effective_positive_threshold();
        let neg = config.sentiment.effective_negative_threshold();
        if !(-1.0..=1.0).contains(&pos) || !(-1.0..=1.0).contains(&neg) || neg > pos {
            return Err(ConfigError::ValidationFailed {
                field: "sentiment.positive_threshold".to_string(),
                message: format!(
                    "thresholds must lie in [-1, 1] with negative <= positive (got {neg} / {pos})"
                ),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.storelens/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut StorelensConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: StorelensConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut StorelensConfig, other: &StorelensConfig) {
        fn take<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                dst.clone_from(src);
            }
        }

        // Scoring
        let (b, o) = (&mut base.scoring, &other.scoring);
        take(&mut b.multi_source_confidence, &o.multi_source_confidence);
        take(&mut b.corroborated_confidence, &o.corroborated_confidence);
        take(&mut b.single_source_confidence, &o.single_source_confidence);
        take(&mut b.reviews_only_confidence, &o.reviews_only_confidence);
        take(&mut b.min_sources_for_multi, &o.min_sources_for_multi);
        take(&mut b.corroboration_review_hits, &o.corroboration_review_hits);
        take(&mut b.reviews_only_review_hits, &o.reviews_only_review_hits);
        take(&mut b.patterns_path, &o.patterns_path);

        // Matrix
        let (b, o) = (&mut base.matrix, &other.matrix);
        take(&mut b.min_confidence, &o.min_confidence);
        take(&mut b.min_review_hits, &o.min_review_hits);
        take(&mut b.sentiment_weighting, &o.sentiment_weighting);

        // Sentiment
        let (b, o) = (&mut base.sentiment, &other.sentiment);
        take(&mut b.positive_threshold, &o.positive_threshold);
        take(&mut b.negative_threshold, &o.negative_threshold);
        take(&mut b.since_days, &o.since_days);
        take(&mut b.min_words, &o.min_words);
        take(&mut b.min_chars, &o.min_chars);
        take(&mut b.special_only, &o.special_only);
        take(&mut b.drop_neutrals_for_agg, &o.drop_neutrals_for_agg);

        // Reviews
        take(&mut base.reviews.dedupe_scope, &other.reviews.dedupe_scope);

        // Cleaning
        let (b, o) = (&mut base.cleaning, &other.cleaning);
        take(&mut b.min_rating_count, &o.min_rating_count);
        take(&mut b.min_play_installs, &o.min_play_installs);
        take(&mut b.min_cws_users, &o.min_cws_users);
        take(&mut b.min_relevance, &o.min_relevance);

        // LLM
        let (b, o) = (&mut base.llm, &other.llm);
        take(&mut b.max_attempts, &o.max_attempts);
        take(&mut b.sleep_ms, &o.sleep_ms);
        take(&mut b.resume, &o.resume);
        take(&mut b.timeout_ms, &o.timeout_ms);
        take(&mut b.prompt, &o.prompt);
    }

    /// Apply environment variable overrides.
    /// Pattern: `STORELENS_SCORING_PATTERNS_PATH`, `STORELENS_MATRIX_MIN_CONFIDENCE`, etc.
    fn apply_env_overrides(config: &mut StorelensConfig) {
        fn parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
            std::env::var(var).ok().and_then(|v| v.trim().parse::<T>().ok())
        }

        if let Ok(val) = std::env::var("STORELENS_SCORING_PATTERNS_PATH") {
            config.scoring.patterns_path = Some(val);
        }
        if let Some(v) = parsed::<f64>("STORELENS_MATRIX_MIN_CONFIDENCE") {
            config.matrix.min_confidence = Some(v);
        }
        if let Some(v) = parsed::<u32>("STORELENS_MATRIX_MIN_REVIEW_HITS") {
            config.matrix.min_review_hits = Some(v);
        }
        if let Ok(val) = std::env::var("STORELENS_MATRIX_SENTIMENT_WEIGHTING") {
            if let Some(v) = SentimentWeighting::parse(&val) {
                config.matrix.sentiment_weighting = Some(v);
            }
        }
        if let Some(v) = parsed::<u32>("STORELENS_SENTIMENT_SINCE_DAYS") {
            config.sentiment.since_days = Some(v);
        }
        if let Some(v) = parsed::<usize>("STORELENS_SENTIMENT_MIN_WORDS") {
            config.sentiment.min_words = Some(v);
        }
        if let Some(v) = parsed::<usize>("STORELENS_SENTIMENT_MIN_CHARS") {
            config.sentiment.min_chars = Some(v);
        }
        if let Ok(val) = std::env::var("STORELENS_REVIEWS_DEDUPE_SCOPE") {
            if let Some(v) = DedupeScope::parse(&val) {
                config.reviews.dedupe_scope = Some(v);
            }
        }
        if let Some(v) = parsed::<f64>("STORELENS_CLEANING_MIN_RELEVANCE") {
            config.cleaning.min_relevance = Some(v);
        }
        if let Some(v) = parsed::<u32>("STORELENS_LLM_MAX_ATTEMPTS") {
            config.llm.max_attempts = Some(v);
        }
        if let Some(v) = parsed::<u64>("STORELENS_LLM_SLEEP_MS") {
            config.llm.sleep_ms = Some(v);
        }
        if let Some(v) = parsed::<u64>("STORELENS_LLM_TIMEOUT_MS") {
            config.llm.timeout_ms = Some(v);
        }
        if let Ok(val) = std::env::var("STORELENS_LLM_PROMPT") {
            if let Some(v) = PromptStyle::parse(&val) {
                config.llm.prompt = Some(v);
            }
        }
    }

    /// Apply CLI overrides (highest priority).
    fn apply_cli_overrides(config: &mut StorelensConfig, cli: &CliOverrides) {
        if let Some(ref v) = cli.patterns_path {
            config.scoring.patterns_path = Some(v.clone());
        }
        if let Some(v) = cli.min_confidence {
            config.matrix.min_confidence = Some(v);
        }
        if let Some(v) = cli.min_review_hits {
            config.matrix.min_review_hits = Some(v);
        }
        if let Some(v) = cli.sentiment_weighting {
            config.matrix.sentiment_weighting = Some(v);
        }
        if let Some(v) = cli.since_days {
            config.sentiment.since_days = Some(v);
        }
        if let Some(v) = cli.min_words {
            config.sentiment.min_words = Some(v);
        }
        if let Some(v) = cli.min_chars {
            config.sentiment.min_chars = Some(v);
        }
        if let Some(v) = cli.special_only {
            config.sentiment.special_only = Some(v);
        }
        if let Some(v) = cli.drop_neutrals_for_agg {
            config.sentiment.drop_neutrals_for_agg = Some(v);
        }
        if let Some(v) = cli.dedupe_scope {
            config.reviews.dedupe_scope = Some(v);
        }
        if let Some(v) = cli.min_rating_count {
            config.cleaning.min_rating_count = Some(v);
        }
        if let Some(v) = cli.min_play_installs {
            config.cleaning.min_play_installs = Some(v);
        }
        if let Some(v) = cli.min_cws_users {
            config.cleaning.min_cws_users = Some(v);
        }
        if let Some(v) = cli.min_relevance {
            config.cleaning.min_relevance = Some(v);
        }
        if let Some(v) = cli.max_attempts {
            config.llm.max_attempts = Some(v);
        }
        if let Some(v) = cli.sleep_ms {
            config.llm.sleep_ms = Some(v);
        }
        if let Some(v) = cli.resume {
            config.llm.resume = Some(v);
        }
        if let Some(v) = cli.timeout_ms {
            config.llm.timeout_ms = Some(v);
        }
        if let Some(v) = cli.prompt {
            config.llm.prompt = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user-level config directory: `~/.storelens/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".storelens"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
