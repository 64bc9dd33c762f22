//! Tagged-variant parsing of labeler responses.
//!
//! A response is reduced to JSON (code fences stripped, first object or
//! array extracted) and then matched against the accepted shapes in a
//! fixed order. Nothing recognizable yields [`LabelResponse::Empty`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use storelens_core::errors::LabelParseError;
use storelens_core::types::FxHashMap;

/// Support label used when a response gives none.
pub const DEFAULT_SUPPORT: &str = "neutral";

const NAME_KEYS: [&str; 3] = ["name", "feature", "feature_name"];

static FENCE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:json)?\s*").unwrap());

static FENCE_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*```$").unwrap());

static FENCED_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").unwrap());

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One named feature from a list-shaped response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureEntry {
    pub name: String,
    /// Inline `support` or `label`.
    pub support: Option<String>,
    /// Inline `flag` or `present`.
    pub present: Option<bool>,
    pub confidence: Option<f64>,
}

/// One entry of a `{feature: {present, confidence}}` map.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceEntry {
    pub feature: String,
    pub present: bool,
    pub confidence: Option<f64>,
}

/// Accepted response shapes, in match priority.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelResponse {
    /// `["a", {"name": "b"}]`
    BareList(Vec<FeatureEntry>),
    /// `{"features": [...]}`
    FeatureObjects(Vec<FeatureEntry>),
    /// `{"items": [...]}`
    ItemsFallback(Vec<FeatureEntry>),
    /// `{"blocking": {"present": true, "confidence": 0.9}, ...}`
    PresenceMap(Vec<PresenceEntry>),
    Empty,
}

impl LabelResponse {
    /// Feature names in response order.
    pub fn feature_names(&self) -> Vec<&str> {
        match self {
            Self::BareList(e) | Self::FeatureObjects(e) | Self::ItemsFallback(e) => {
                e.iter().map(|f| f.name.as_str()).collect()
            }
            Self::PresenceMap(e) => e.iter().map(|p| p.feature.as_str()).collect(),
            Self::Empty => Vec::new(),
        }
    }

    /// Explicit presence judgments: presence-map entries, or list entries
    /// that carry a flag.
    pub fn presence(&self) -> Vec<PresenceEntry> {
        match self {
            Self::PresenceMap(e) => e.clone(),
            Self::BareList(e) | Self::FeatureObjects(e) | Self::ItemsFallback(e) => e
                .iter()
                .filter_map(|f| {
                    f.present.map(|present| PresenceEntry {
                        feature: f.name.clone(),
                        present,
                        confidence: f.confidence,
                    })
                })
                .collect(),
            Self::Empty => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Normalized feature name -> support label, plus an optional global label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportMap {
    by_feature: FxHashMap<String, String>,
    global: Option<String>,
}

impl SupportMap {
    fn add(&mut self, name: &str, label: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let label = label.trim();
        let label = if label.is_empty() { DEFAULT_SUPPORT } else { label };
        self.by_feature.insert(normalize_feature(name), label.to_string());
    }

    /// Per-feature label, else the global label, else `neutral`.
    pub fn support_for(&self, feature: &str) -> &str {
        self.by_feature
            .get(&normalize_feature(feature))
            .or(self.global.as_ref())
            .map(String::as_str)
            .unwrap_or(DEFAULT_SUPPORT)
    }

    pub fn global(&self) -> Option<&str> {
        self.global.as_deref()
    }

    pub fn len(&self) -> usize {
        self.by_feature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_feature.is_empty() && self.global.is_none()
    }
}

/// A parsed response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLabels {
    pub response: LabelResponse,
    pub support: SupportMap,
}

impl ParsedLabels {
    pub fn empty() -> Self {
        Self {
            response: LabelResponse::Empty,
            support: SupportMap::default(),
        }
    }
}

/// Lowercase, trim, collapse whitespace.
pub fn normalize_feature(name: &str) -> String {
    SPACE_RE
        .replace_all(name.trim(), " ")
        .to_lowercase()
}

/// Remove a surrounding ```json fence.
pub fn strip_code_fence(text: &str) -> &str {
    let s = text.trim();
    if !s.starts_with("```") {
        return s;
    }
    let start = FENCE_OPEN_RE.find(s).map(|m| m.end()).unwrap_or(0);
    let inner = &s[start..];
    let end = FENCE_CLOSE_RE.find(inner).map(|m| m.start()).unwrap_or(inner.len());
    inner[..end].trim()
}

/// Pull a JSON value out of free text: the whole (unfenced) text, then a
/// fenced object, then the outermost `{...}`, then the outermost `[...]`.
pub fn extract_json(text: &str) -> Result<Value, LabelParseError> {
    let s = strip_code_fence(text);
    if s.is_empty() {
        return Err(LabelParseError::NoPayload);
    }
    let mut last_err = None;
    let mut attempt = |candidate: &str| match serde_json::from_str::<Value>(candidate) {
        Ok(v) => Some(v),
        Err(e) => {
            last_err = Some(e.to_string());
            None
        }
    };

    if let Some(v) = attempt(s) {
        return Ok(v);
    }
    if let Some(c) = FENCED_OBJECT_RE.captures(text).and_then(|c| c.get(1)) {
        if let Some(v) = attempt(c.as_str()) {
            return Ok(v);
        }
    }
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(a), Some(b)) = (s.find(open), s.rfind(close)) {
            if a < b {
                if let Some(v) = attempt(&s[a..=b]) {
                    return Ok(v);
                }
            }
        }
    }
    Err(match last_err {
        Some(msg) if s.contains('{') || s.contains('[') => LabelParseError::InvalidJson(msg),
        _ => LabelParseError::NoPayload,
    })
}

/// Classify an already-decoded value. Never fails; unknown shapes are
/// `Empty`.
pub fn parse_value(value: &Value) -> ParsedLabels {
    let response = match value {
        Value::Array(items) => LabelResponse::BareList(entries(items)),
        Value::Object(obj) => classify_object(obj),
        _ => LabelResponse::Empty,
    };
    let response = match response {
        LabelResponse::BareList(e) if e.is_empty() => LabelResponse::Empty,
        LabelResponse::FeatureObjects(e) if e.is_empty() => LabelResponse::Empty,
        LabelResponse::ItemsFallback(e) if e.is_empty() => LabelResponse::Empty,
        LabelResponse::PresenceMap(e) if e.is_empty() => LabelResponse::Empty,
        other => other,
    };
    ParsedLabels {
        response,
        support: support_map(value),
    }
}

/// Extract and classify. Only a missing or undecodable payload is an error.
pub fn parse_labels(text: &str) -> Result<ParsedLabels, LabelParseError> {
    extract_json(text).map(|v| parse_value(&v))
}

fn classify_object(obj: &Map<String, Value>) -> LabelResponse {
    if let Some(Value::Array(items)) = obj.get("features") {
        return LabelResponse::FeatureObjects(entries(items));
    }
    if let Some(Value::Array(items)) = obj.get("items") {
        return LabelResponse::ItemsFallback(entries(items));
    }
    let presence: Vec<PresenceEntry> = obj
        .iter()
        .filter_map(|(k, v)| {
            let inner = v.as_object()?;
            let present = inner
                .get("present")
                .or_else(|| inner.get("flag"))
                .and_then(as_bool)?;
            Some(PresenceEntry {
                feature: k.trim().to_string(),
                present,
                confidence: inner.get("confidence").and_then(as_f64),
            })
        })
        .filter(|p| !p.feature.is_empty())
        .collect();
    if presence.is_empty() {
        LabelResponse::Empty
    } else {
        LabelResponse::PresenceMap(presence)
    }
}

fn entries(items: &[Value]) -> Vec<FeatureEntry> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(FeatureEntry {
                name: s.trim().to_string(),
                ..Default::default()
            }),
            Value::Object(obj) => Some(FeatureEntry {
                name: entry_name(obj)?,
                support: first_str(obj, &["support", "label"]),
                present: obj
                    .get("flag")
                    .or_else(|| obj.get("present"))
                    .and_then(as_bool),
                confidence: obj.get("confidence").and_then(as_f64),
            }),
            _ => None,
        })
        .filter(|e| !e.name.is_empty())
        .collect()
}

fn entry_name(obj: &Map<String, Value>) -> Option<String> {
    first_str(obj, &NAME_KEYS)
}

fn first_str(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
}

fn as_bool(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|x| x != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `goldilocks_support` (object or list), inline support in `features`,
/// and a global `support` string.
fn support_map(value: &Value) -> SupportMap {
    let mut map = SupportMap::default();
    let Value::Object(obj) = value else {
        return map;
    };

    match obj.get("goldilocks_support") {
        Some(Value::Object(gs)) => {
            for (k, v) in gs {
                let label = match v {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                map.add(k, &label);
            }
        }
        Some(Value::Array(items)) => {
            for item in items.iter().filter_map(Value::as_object) {
                if let (Some(name), Some(label)) =
                    (entry_name_goldilocks(item), first_str(item, &["label", "support"]))
                {
                    map.add(&name, &label);
                }
            }
        }
        _ => {}
    }

    if let Some(Value::Array(items)) = obj.get("features") {
        for item in items.iter().filter_map(Value::as_object) {
            if let (Some(name), Some(label)) =
                (entry_name(item), first_str(item, &["support", "label"]))
            {
                map.add(&name, &label);
            }
        }
    }

    if let Some(Value::String(s)) = obj.get("support") {
        map.global = Some(s.trim().to_string());
    }
    map
}

fn entry_name_goldilocks(obj: &Map<String, Value>) -> Option<String> {
    first_str(obj, &["feature", "name", "feature_name"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_extract_from_prose() {
        let v = extract_json("Sure! Here you go:\n{\"features\": [\"Timer\"]}\nThanks").unwrap();
        assert_eq!(v, json!({"features": ["Timer"]}));
        assert!(matches!(extract_json("   "), Err(LabelParseError::NoPayload)));
        assert!(matches!(extract_json("no json here"), Err(LabelParseError::NoPayload)));
        assert!(matches!(extract_json("{not json}"), Err(LabelParseError::InvalidJson(_))));
    }

    #[test]
    fn test_bare_list_shape() {
        let p = parse_value(&json!(["Timer", {"feature": "Site Blocker"}, 3, {"x": 1}]));
        assert_eq!(p.response.feature_names(), vec!["Timer", "Site Blocker"]);
        assert!(matches!(p.response, LabelResponse::BareList(_)));
    }

    #[test]
    fn test_feature_objects_with_support() {
        let p = parse_value(&json!({
            "features": [{"name": "Focus  Timer", "support": "strong_support"}, "Streaks"],
            "goldilocks_support": {"streaks": "undermining"},
            "support": "neutral"
        }));
        assert!(matches!(p.response, LabelResponse::FeatureObjects(_)));
        assert_eq!(p.support.support_for("focus timer"), "strong_support");
        assert_eq!(p.support.support_for("Streaks"), "undermining");
        assert_eq!(p.support.support_for("other"), "neutral");
    }

    #[test]
    fn test_goldilocks_list_and_global() {
        let p = parse_value(&json!({
            "items": ["A", "B"],
            "goldilocks_support": [{"feature": "a", "label": "strong_support"}],
            "support": "undermining"
        }));
        assert!(matches!(p.response, LabelResponse::ItemsFallback(_)));
        assert_eq!(p.support.support_for("A"), "strong_support");
        assert_eq!(p.support.support_for("B"), "undermining");
    }

    #[test]
    fn test_presence_map_and_inline_flags() {
        let p = parse_value(&json!({
            "blocking": {"present": true, "confidence": 0.9},
            "timer": {"present": "no"},
            "summary": "text"
        }));
        let mut presence = p.response.presence();
        presence.sort_by(|a, b| a.feature.cmp(&b.feature));
        assert_eq!(presence.len(), 2);
        assert!(presence[0].present);
        assert_eq!(presence[0].confidence, Some(0.9));
        assert!(!presence[1].present);

        let p = parse_value(&json!({"features": [{"name": "timer", "flag": true, "confidence": 0.8}]}));
        assert_eq!(p.response.presence()[0].feature, "timer");
    }

    #[test]
    fn test_unrecognized_is_empty() {
        assert!(parse_value(&json!({"summary": "nothing"})).response.is_empty());
        assert!(parse_value(&json!({"features": []})).response.is_empty());
        assert!(parse_value(&json!("text")).response.is_empty());
    }
}
