//! Short-lived response cache.
//!
//! One cache lives for the lifetime of one configured client. Entries expire
//! after a fixed TTL and are dropped lazily when a lookup finds them stale.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default time-to-live (8 minutes).
pub const CACHE_EXPIRATION: Duration = Duration::from_secs(480);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
}

/// Response cache keyed by endpoint and arguments.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CACHE_EXPIRATION)
    }
}

impl ResponseCache {
    /// Create a cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A poisoned map still holds consistent entries.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store a value, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.lock().insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Return a live value, evicting the entry if it has expired.
    pub fn retrieve(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;

        if entry.inserted_at.elapsed() <= self.ttl {
            tracing::debug!("Cache hit: {}", key);
            return Some(entry.value.clone());
        }

        tracing::debug!("Cache expired: {}", key);
        entries.remove(key);
        None
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key for a calendar window.
pub fn calendar_key(scope: &str, path: &str, from_date: &str, days: u32) -> String {
    format!("user_calendar_{}_{}_{}_{}", scope, path, from_date, days)
}

/// Cache key for a show's watched progress.
pub fn show_progress_key(show_id: u64) -> String {
    format!("show_progress_{}", show_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_then_retrieve() {
        let cache = ResponseCache::default();
        cache.insert("show_progress_1", json!({"aired": 10, "completed": 4}));

        assert_eq!(
            cache.retrieve("show_progress_1"),
            Some(json!({"aired": 10, "completed": 4}))
        );
        assert_eq!(cache.retrieve("show_progress_2"), None);
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::from_millis(10));
        cache.insert("user_calendar_my_shows_2022-03-12_33", json!([]));
        assert_eq!(cache.len(), 1);

        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.retrieve("user_calendar_my_shows_2022-03-12_33"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_overwrites() {
        let cache = ResponseCache::default();
        cache.insert("k", json!(1));
        cache.insert("k", json!(2));
        assert_eq!(cache.retrieve("k"), Some(json!(2)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_calendar_key_includes_scope() {
        assert_ne!(
            calendar_key("my", "shows", "2022-03-12", 33),
            calendar_key("all", "shows", "2022-03-12", 33)
        );
    }
}
