//! Store and app identifiers.
//!
//! `AppKey` is the join key of every table. It is store-prefixed
//! (`play:<package>`, `ios:id<digits>`, `cws:<extid>`) and stable across
//! re-scrapes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The storefront an app was scraped from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Store {
    PlayStore,
    AppStore,
    ChromeWebStore,
    Other(String),
}

impl Store {
    /// Canonicalize common spellings (`googleplay`, `ios`, `chrome_web_store`, ...).
    pub fn parse(raw: &str) -> Self {
        let t = raw.trim().to_lowercase();
        match t.as_str() {
            "playstore" | "googleplay" | "google_play" | "android" | "play" => Self::PlayStore,
            "appstore" | "ios" | "apple_app_store" | "apple" => Self::AppStore,
            "chromews" | "chrome_web_store" | "chromewebstore" | "cws" | "chrome" => {
                Self::ChromeWebStore
            }
            _ if t.starts_with("play") => Self::PlayStore,
            _ if t.starts_with("appstore") || t.starts_with("ios") => Self::AppStore,
            _ if t.starts_with("chrome") => Self::ChromeWebStore,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Canonical display name used in persisted tables.
    pub fn name(&self) -> &str {
        match self {
            Self::PlayStore => "PlayStore",
            Self::AppStore => "AppStore",
            Self::ChromeWebStore => "ChromeWS",
            Self::Other(s) => s,
        }
    }

    /// Prefix used when building an `AppKey`.
    pub fn key_prefix(&self) -> String {
        match self {
            Self::PlayStore => "play".to_string(),
            Self::AppStore => "ios".to_string(),
            Self::ChromeWebStore => "cws".to_string(),
            Self::Other(s) => s.to_lowercase(),
        }
    }

    /// Inverse of `key_prefix` for the three known stores.
    pub fn from_key_prefix(prefix: &str) -> Self {
        match prefix {
            "play" => Self::PlayStore,
            "ios" | "appstore" => Self::AppStore,
            "cws" | "chrome" => Self::ChromeWebStore,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Store {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Store {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// Globally unique, store-prefixed application identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppKey(String);

impl AppKey {
    /// Wrap an already-formed key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    /// Build a key from a store and its platform id.
    ///
    /// App Store ids are normalized to `id<digits>` so that `123`,
    /// `id123`, and `https://apps.apple.com/.../id123` agree.
    pub fn compute(store: &Store, platform_id: &str) -> Self {
        let pid = platform_id.trim();
        match store {
            Store::AppStore if !pid.starts_with("id") => {
                let digits: String = pid
                    .chars()
                    .skip_while(|c| !c.is_ascii_digit())
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                let id = if digits.is_empty() { pid } else { &digits };
                Self(format!("ios:id{id}"))
            }
            _ => Self(format!("{}:{}", store.key_prefix(), pid)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The store prefix (`play`, `ios`, `cws`, ...), if the key has one.
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once(':').map(|(p, _)| p)
    }

    /// The platform id after the prefix, or the whole key when unprefixed.
    pub fn platform_id(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AppKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
