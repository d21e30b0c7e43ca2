//! [`EntityCache`] doubles.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use ticketdesk_core::cache::{CacheError, CacheResult, EntityCache};

#[derive(Clone, Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-memory cache with per-entry expiry.
///
/// Expired entries read as misses. Clones share state.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ticketdesk_core::EntityCache;
/// use ticketdesk_testing::InMemoryCache;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let cache = InMemoryCache::new();
/// cache.set("ticket:1", b"{}".to_vec(), Duration::from_secs(300)).await?;
/// assert!(cache.contains_key("ticket:1"));
/// assert_eq!(cache.ttl_of("ticket:1"), Some(Duration::from_secs(300)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    ttls: Arc<RwLock<HashMap<String, Duration>>>,
    sets: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
}

impl InMemoryCache {
    /// Create a new empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a live entry exists under `key`
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap()
            .get(key)
            .is_some_and(|entry| entry.expires_at > Instant::now())
    }

    /// Number of stored entries (live or expired)
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Check if the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// TTL passed on the last write of `key`
    #[must_use]
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.ttls.read().unwrap().get(key).copied()
    }

    /// Number of `set` calls so far
    #[must_use]
    pub fn set_count(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    /// Number of `delete` calls so far
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Store raw bytes under `key` without counting a write.
    ///
    /// Useful for seeding stale or corrupt entries.
    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.entries.write().unwrap().insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: Instant::now() + Duration::from_secs(3600),
            },
        );
    }

    /// Force `key` to be expired, as if its TTL lapsed.
    pub fn expire(&self, key: &str) {
        if let Some(entry) = self.entries.write().unwrap().get_mut(key) {
            entry.expires_at = Instant::now();
        }
    }
}

impl EntityCache for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .unwrap()
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries.write().unwrap().insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        self.ttls.write().unwrap().insert(key.to_string(), ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

/// Cache whose every call fails, for outage tests.
#[derive(Clone, Debug, Default)]
pub struct FailingCache {
    calls: Arc<AtomicUsize>,
}

impl FailingCache {
    /// Create a new failing cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls attempted so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CacheError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CacheError::Backend("cache unreachable".into())
    }
}

impl EntityCache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(self.fail())
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
        Err(self.fail())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(self.fail())
    }
}
