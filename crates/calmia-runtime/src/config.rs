//! Runtime configuration for the recommendation service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plan cache tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached plans
    pub max_entries: u64,

    /// How long a cached plan stays valid ("5m", "90s")
    #[serde(with = "human_duration")]
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1_024,
            // Environment documents are edited out-of-band; a short TTL
            // bounds how stale a served plan can be.
            ttl: Duration::from_secs(300),
        }
    }
}

/// Configuration for [`RecommendationService`](crate::RecommendationService).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Plan cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Serde adapter for human-readable durations.
mod human_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}
