//! Analytics snapshot cache.
//!
//! The cache is an accelerator, never a source of truth: every entry can be
//! recomputed from the conflict history, and explicit invalidation is the
//! primary consistency mechanism. Keys are enumerable per scope, so scoped
//! invalidation walks the bounded key set instead of scanning entries.

use crate::config::{CacheBackend, Config};
use accord_engine::TimeRange;
use dashmap::DashMap;
use moka::sync::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const RANGES: [TimeRange; 3] = [TimeRange::Week, TimeRange::Month, TimeRange::Year];

/// Cache for derived analytics snapshots, keyed by `(kind, range, scope)`.
pub trait AnalyticsCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value);
    fn invalidate(&self, key: &str);
    fn invalidate_all(&self);

    /// Drop every snapshot scoped to one user.
    fn invalidate_user(&self, user_id: &str) {
        for key in user_scope_keys(user_id) {
            self.invalidate(&key);
        }
    }

    /// Drop every snapshot scoped to one document.
    fn invalidate_document(&self, document_id: &str) {
        for key in document_scope_keys(document_id) {
            self.invalidate(&key);
        }
    }
}

/// Key for an analytics snapshot, optionally scoped to a user or document.
pub fn analytics_key(
    time_range: TimeRange,
    user_id: Option<&str>,
    document_id: Option<&str>,
) -> String {
    format!(
        "analytics:{}:{}",
        time_range.as_str(),
        scope(user_id, document_id)
    )
}

/// Key for a conflict timeline, optionally scoped to a user.
pub fn timeline_key(time_range: TimeRange, user_id: Option<&str>) -> String {
    format!("timeline:{}:{}", time_range.as_str(), scope(user_id, None))
}

/// Key for one user's conflict stats.
pub fn user_stats_key(user_id: &str) -> String {
    format!("user-stats:{user_id}")
}

/// Key for one document's conflict stats.
pub fn document_stats_key(document_id: &str) -> String {
    format!("document-stats:{document_id}")
}

fn scope(user_id: Option<&str>, document_id: Option<&str>) -> String {
    match (user_id, document_id) {
        (Some(user), Some(document)) => format!("user:{user}:doc:{document}"),
        (Some(user), None) => format!("user:{user}"),
        (None, Some(document)) => format!("doc:{document}"),
        (None, None) => "global".to_string(),
    }
}

fn user_scope_keys(user_id: &str) -> Vec<String> {
    let mut keys = vec![user_stats_key(user_id)];
    for range in RANGES {
        keys.push(analytics_key(range, Some(user_id), None));
        keys.push(timeline_key(range, Some(user_id)));
    }
    keys
}

fn document_scope_keys(document_id: &str) -> Vec<String> {
    let mut keys = vec![document_stats_key(document_id)];
    for range in RANGES {
        keys.push(analytics_key(range, None, Some(document_id)));
    }
    keys
}

/// Unbounded in-process cache. Entries live until explicitly invalidated.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Value>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnalyticsCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    fn invalidate_all(&self) {
        self.entries.clear();
    }
}

/// Bounded in-process cache with a TTL safety net.
///
/// Explicit invalidation remains the consistency mechanism; the TTL only
/// caps how long a snapshot can outlive a missed invalidation call.
pub struct BoundedCache {
    entries: Cache<String, Value>,
}

impl BoundedCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl AnalyticsCache for BoundedCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key)
    }

    fn put(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn invalidate(&self, key: &str) {
        self.entries.invalidate(key);
    }

    fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

/// Build the cache the configuration asked for.
pub fn create_cache(config: &Config) -> Arc<dyn AnalyticsCache> {
    match config.cache_backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Bounded => Arc::new(BoundedCache::new(
            config.cache_capacity,
            Duration::from_secs(config.cache_ttl_secs),
        )),
    }
}
