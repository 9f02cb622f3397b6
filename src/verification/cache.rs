//! TTL memoization of verification outcomes per address.

use crate::core::models::VerificationOutcome;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

struct CacheEntry {
    outcome: VerificationOutcome,
    created_at: Instant,
}

/// A result cache with lazy, read-time expiry.
///
/// Entries are owned exclusively by the cache; callers always receive a
/// copy with `from_cache` set. There is no background sweep, so an expired
/// entry occupies memory until the next read of its key.
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a cached copy if the entry is still fresh; evicts it and
    /// returns `None` once the TTL has elapsed.
    pub fn get(&self, address: &str) -> Option<VerificationOutcome> {
        let mut entries = self.entries.lock();
        match entries.get(address) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => {
                Some(entry.outcome.as_cached())
            }
            Some(_) => {
                entries.remove(address);
                None
            }
            None => None,
        }
    }

    /// Like `get` without the copy, for callers that only need presence.
    pub fn contains(&self, address: &str) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(address) {
            Some(entry) if entry.created_at.elapsed() < self.ttl => true,
            Some(_) => {
                entries.remove(address);
                false
            }
            None => false,
        }
    }

    /// Stores `outcome` for `address`, overwriting any prior entry.
    pub fn put(&self, address: &str, outcome: &VerificationOutcome) {
        let mut entries = self.entries.lock();
        entries.insert(
            address.to_string(),
            CacheEntry {
                outcome: outcome.clone(),
                created_at: Instant::now(),
            },
        );
    }

    /// Drops all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::VerificationStatus;

    fn outcome(email: &str) -> VerificationOutcome {
        VerificationOutcome::new(email, VerificationStatus::Valid, "ok")
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_is_served_as_cached_copy() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("a@example.com", &outcome("a@example.com"));

        let hit = cache.get("a@example.com").expect("fresh entry");
        assert!(hit.from_cache);
        assert_eq!(hit.status, VerificationStatus::Valid);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_evicted_on_read() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("a@example.com", &outcome("a@example.com"));

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(cache.get("a@example.com").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn entry_just_inside_ttl_survives() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("a@example.com", &outcome("a@example.com"));

        tokio::time::advance(Duration::from_secs(59)).await;

        assert!(cache.get("a@example.com").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn put_overwrites_and_refreshes() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("a@example.com", &outcome("a@example.com"));

        tokio::time::advance(Duration::from_secs(45)).await;
        let newer =
            VerificationOutcome::new("a@example.com", VerificationStatus::Invalid, "changed");
        cache.put("a@example.com", &newer);

        tokio::time::advance(Duration::from_secs(30)).await;
        let hit = cache.get("a@example.com").expect("refreshed entry");
        assert_eq!(hit.status, VerificationStatus::Invalid);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_drops_everything() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.put("a@example.com", &outcome("a@example.com"));
        cache.put("b@example.com", &outcome("b@example.com"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a@example.com").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn contains_tracks_expiry() {
        let cache = ResultCache::new(Duration::from_secs(10));
        cache.put("a@example.com", &outcome("a@example.com"));
        assert!(cache.contains("a@example.com"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(!cache.contains("a@example.com"));
        assert!(cache.is_empty());
    }
}
