//! In-memory TTL cache shared by every fetch path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::domain::Fundamentals;

/// Payload stored in the shared quote cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CachedValue {
    Price(f64),
    Fundamentals(Fundamentals),
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> CacheInner<V> {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    fn get(&mut self, key: &str, now: Instant) -> Option<V> {
        let expired = now >= self.map.get(key)?.expires_at;
        if expired {
            self.map.remove(key);
            return None;
        }
        self.map.get(key).map(|entry| entry.value.clone())
    }

    fn put(&mut self, key: String, value: V, expires_at: Instant) {
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    fn clear_expired(&mut self, now: Instant) {
        self.map.retain(|_, entry| entry.expires_at > now);
    }
}

/// Thread-safe key/value store with per-entry expiry.
///
/// Expired entries are never returned and are dropped on the lookup that
/// finds them stale; [`TtlCache::clear_expired`] is an optional sweep.
pub struct TtlCache<V> {
    inner: Mutex<CacheInner<V>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(CacheInner::new()),
            clock,
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        self.lock().put(key.into(), value, expires_at);
    }

    /// Returns the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        self.lock().get(key, now)
    }

    /// Removes `key`; returns whether an entry was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().map.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().map.clear();
    }

    pub fn clear_expired(&self) {
        let now = self.clock.now();
        self.lock().clear_expired(now);
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
