//! In-memory response cache with TTL expiry and LRU eviction.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use conclave_domain::{CacheKey, GatewayResponse};

struct CacheEntry {
    response: GatewayResponse,
    inserted_at: Instant,
    last_used: u64,
}

struct CacheInner {
    entries: HashMap<CacheKey, CacheEntry>,
    // Monotonic access counter used as the LRU clock.
    tick: u64,
}

/// Bounded cache of gateway responses keyed by [`CacheKey`].
///
/// Entries expire `ttl` after insertion regardless of use. When the cache is
/// full, inserting a new key evicts the least recently used entry.
pub struct ResponseCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                tick: 0,
            }),
            capacity,
            ttl,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<GatewayResponse> {
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;
        let now = Instant::now();

        let expired = match inner.entries.get_mut(key) {
            Some(entry) if now.duration_since(entry.inserted_at) < self.ttl => {
                entry.last_used = tick;
                return Some(entry.response.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!("cache entry expired");
            inner.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: CacheKey, response: GatewayResponse) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.lock();
        inner.tick += 1;
        let tick = inner.tick;

        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&key) {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!("cache full, evicting least recently used entry");
                inner.entries.remove(&oldest);
            }
        }

        inner.entries.insert(
            key,
            CacheEntry {
                response,
                inserted_at: Instant::now(),
                last_used: tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u32) -> CacheKey {
        CacheKey::compute(&format!("prompt {n}"), None, 0.7, 2048, None)
    }

    fn response(text: &str) -> GatewayResponse {
        GatewayResponse::new("mock", "mock-model", text)
    }

    #[test]
    fn test_hit_returns_stored_response() {
        let cache = ResponseCache::new(4, Duration::from_secs(60));
        cache.insert(key(1), response("cached"));
        let hit = cache.get(&key(1));
        assert_eq!(hit.map(|r| r.text), Some("cached".to_string()));
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = ResponseCache::new(4, Duration::from_secs(60));
        assert!(cache.get(&key(1)).is_none());
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let cache = ResponseCache::new(4, Duration::ZERO);
        cache.insert(key(1), response("stale"));
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let cache = ResponseCache::new(2, Duration::from_secs(60));
        cache.insert(key(1), response("one"));
        cache.insert(key(2), response("two"));

        // Touch key 1 so key 2 becomes the eviction candidate.
        assert!(cache.get(&key(1)).is_some());

        cache.insert(key(3), response("three"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(2)).is_none());
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn test_reinsert_updates_existing_entry() {
        let cache = ResponseCache::new(2, Duration::from_secs(60));
        cache.insert(key(1), response("old"));
        cache.insert(key(1), response("new"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)).map(|r| r.text), Some("new".to_string()));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = ResponseCache::new(0, Duration::from_secs(60));
        cache.insert(key(1), response("dropped"));
        assert!(cache.is_empty());
    }
}
