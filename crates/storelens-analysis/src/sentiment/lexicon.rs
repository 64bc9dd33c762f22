//! Lexicon-based polarity engine.
//!
//! Token valences come from a word list on a -4..+4 scale. Each valence is
//! adjusted by booster words in the preceding three tokens, flipped and
//! damped by a negation in the same window, weighted around a contrastive
//! "but", and emphasized by capitals and exclamation marks. The sum is
//! squashed into [-1, 1] with `x / sqrt(x^2 + 15)`.

use storelens_core::config::SentimentConfig;
use storelens_core::constants;
use storelens_core::traits::polarity::label_for;
use storelens_core::traits::{PolarityEngine, PolarityScore};
use storelens_core::types::FxHashMap;

const BUILTIN_LEXICON: &str = include_str!("../../lexicon/valence.tsv");

const NEGATION_SCALAR: f64 = -0.74;
const BOOSTER_INCR: f64 = 0.293;
const BOOSTER_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const EXCLAMATION_INCR: f64 = 0.292;
const MAX_EXCLAMATIONS: usize = 4;
const QUESTION_INCR: f64 = 0.18;
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Damping of a booster or negation by distance (1, 2, 3 tokens back).
const WINDOW_DAMPING: [f64; 3] = [1.0, 0.95, 0.9];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "nowhere", "cannot",
    "cant", "can't", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't", "isnt", "isn't",
    "wasnt", "wasn't", "arent", "aren't", "wont", "won't", "wouldnt", "wouldn't", "shouldnt",
    "shouldn't", "couldnt", "couldn't", "aint", "ain't", "without", "hardly", "rarely", "seldom",
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely", "amazingly", "completely", "considerably", "decidedly", "deeply",
    "enormously", "entirely", "especially", "exceptionally", "extremely", "fully", "greatly",
    "highly", "hugely", "incredibly", "intensely", "majorly", "most", "more", "particularly",
    "purely", "quite", "really", "remarkably", "so", "substantially", "thoroughly", "totally",
    "tremendously", "truly", "unbelievably", "utterly", "very",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost", "barely", "kinda", "kindof", "less", "little", "marginally", "occasionally",
    "partly", "scarcely", "slightly", "somewhat", "sorta",
];

/// Default polarity engine.
#[derive(Debug, Clone)]
pub struct LexiconEngine {
    valence: FxHashMap<String, f64>,
    positive_threshold: f64,
    negative_threshold: f64,
}

impl Default for LexiconEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LexiconEngine {
    /// Engine over the shipped word list with ±0.05 thresholds.
    pub fn builtin() -> Self {
        Self::from_lexicon_str(BUILTIN_LEXICON)
    }

    /// Parse a `word<TAB>valence` list. Blank lines, `#` comments, and lines
    /// whose valence does not parse are skipped.
    pub fn from_lexicon_str(lexicon: &str) -> Self {
        let valence = lexicon
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| {
                let mut parts = l.split('\t');
                let word = parts.next()?.trim().to_lowercase();
                let v = parts.next()?.trim().parse::<f64>().ok()?;
                Some((word, v))
            })
            .collect();
        Self {
            valence,
            positive_threshold: constants::DEFAULT_POSITIVE_THRESHOLD,
            negative_threshold: constants::DEFAULT_NEGATIVE_THRESHOLD,
        }
    }

    pub fn with_thresholds(mut self, positive: f64, negative: f64) -> Self {
        self.positive_threshold = positive;
        self.negative_threshold = negative;
        self
    }

    pub fn from_config(config: &SentimentConfig) -> Self {
        Self::builtin().with_thresholds(
            config.effective_positive_threshold(),
            config.effective_negative_threshold(),
        )
    }

    pub fn len(&self) -> usize {
        self.valence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valence.is_empty()
    }

    /// Raw valence sum before normalization.
    pub fn raw_valence(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return 0.0;
        }
        let lower: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let caps_differential = has_caps_differential(&tokens);
        let but_at = lower.iter().position(|t| t == "but");

        let mut sum = 0.0;
        for (i, word) in lower.iter().enumerate() {
            if booster(word).is_some() {
                continue;
            }
            let Some(&base) = self.valence.get(word.as_str()) else {
                continue;
            };
            let mut v = base;
            if caps_differential && is_all_caps(tokens[i]) {
                v += CAPS_INCR.copysign(v);
            }

            let mut negated = false;
            for (d, damping) in WINDOW_DAMPING.iter().enumerate() {
                let Some(j) = i.checked_sub(d + 1) else {
                    break;
                };
                if let Some(b) = booster(&lower[j]) {
                    let mut scalar = if v < 0.0 { -b } else { b };
                    if caps_differential && is_all_caps(tokens[j]) {
                        scalar += CAPS_INCR.copysign(v);
                    }
                    v += scalar * damping;
                }
                if NEGATIONS.contains(&lower[j].as_str()) {
                    negated = true;
                }
            }
            if negated {
                v *= NEGATION_SCALAR;
            }

            if let Some(b) = but_at {
                if i < b {
                    v *= 0.5;
                } else if i > b {
                    v *= 1.5;
                }
            }
            sum += v;
        }

        if sum != 0.0 {
            let emphasis = punctuation_emphasis(text);
            sum += emphasis.copysign(sum);
        }
        sum
    }
}

impl PolarityEngine for LexiconEngine {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn score(&self, text: &str) -> PolarityScore {
        let compound = normalize(self.raw_valence(text));
        PolarityScore {
            compound,
            label: label_for(compound, self.positive_threshold, self.negative_threshold),
        }
    }
}

fn booster(word: &str) -> Option<f64> {
    if BOOSTERS_UP.contains(&word) {
        Some(BOOSTER_INCR)
    } else if BOOSTERS_DOWN.contains(&word) {
        Some(BOOSTER_DECR)
    } else {
        None
    }
}

fn is_all_caps(token: &str) -> bool {
    token.chars().filter(|c| c.is_alphabetic()).count() > 1
        && token.chars().all(|c| !c.is_lowercase())
}

/// Capitals only emphasize when the text mixes shouting and normal words.
fn has_caps_differential(tokens: &[&str]) -> bool {
    let caps = tokens.iter().filter(|t| is_all_caps(t)).count();
    caps > 0 && caps < tokens.len()
}

fn punctuation_emphasis(text: &str) -> f64 {
    let ep = text.matches('!').count().min(MAX_EXCLAMATIONS) as f64 * EXCLAMATION_INCR;
    let qm = text.matches('?').count();
    let qm_amp = match qm {
        0 | 1 => 0.0,
        2 | 3 => qm as f64 * QUESTION_INCR,
        _ => 0.96,
    };
    ep + qm_amp
}

fn normalize(score: f64) -> f64 {
    let n = score / (score * score + NORMALIZATION_ALPHA).sqrt();
    n.clamp(-1.0, 1.0)
}
