//! App cleaning gates.

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CleaningConfig {
    /// Default: 10.
    pub min_rating_count: Option<u64>,
    /// PlayStore install floor when the rating count is too low. Default: 50000.
    pub min_play_installs: Option<u64>,
    /// ChromeWS user floor when the rating count is too low. Default: 10000.
    pub min_cws_users: Option<u64>,
    /// Default: 0.15.
    pub min_relevance: Option<f64>,
}

impl CleaningConfig {
    pub fn effective_min_rating_count(&self) -> u64 {
        self.min_rating_count
            .unwrap_or(constants::DEFAULT_MIN_RATING_COUNT)
    }

    pub fn effective_min_play_installs(&self) -> u64 {
        self.min_play_installs
            .unwrap_or(constants::DEFAULT_MIN_PLAY_INSTALLS)
    }

    pub fn effective_min_cws_users(&self) -> u64 {
        self.min_cws_users.unwrap_or(constants::DEFAULT_MIN_CWS_USERS)
    }

    pub fn effective_min_relevance(&self) -> f64 {
        self.min_relevance.unwrap_or(constants::DEFAULT_MIN_RELEVANCE)
    }
}
