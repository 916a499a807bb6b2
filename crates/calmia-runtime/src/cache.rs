//! Caching layer for calmia-runtime.
//!
//! Recommendation resolution is deterministic per condition, so plans are
//! cached by condition label. The content store is written by external
//! systems, which is why entries are TTL-bounded instead of held forever:
//! an edited environment document becomes visible within one TTL.

use crate::service::TherapyPlan;
use moka::future::Cache;
use std::time::Duration;

/// Therapy plan cache using moka.
pub struct RecommendationCache {
    cache: Cache<String, TherapyPlan>,
}

impl RecommendationCache {
    /// Create a new cache with the given configuration.
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { cache }
    }

    /// Get a cached plan for a condition label.
    pub async fn get(&self, condition: &str) -> Option<TherapyPlan> {
        self.cache.get(condition).await
    }

    /// Store a plan for a condition label.
    pub async fn insert(&self, condition: String, plan: TherapyPlan) {
        self.cache.insert(condition, plan).await;
    }

    /// Clear the cache.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    /// Get cache statistics.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for RecommendationCache {
    fn default() -> Self {
        Self::new(1_024, Duration::from_secs(300))
    }
}
