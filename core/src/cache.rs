//! Cache-aside layer.
//!
//! The cache is a disposable side copy of the store: populated lazily on
//! reads, invalidated after every committed mutation, and never allowed to
//! fail a caller. [`EntityCache`] is the byte-level backend contract
//! (Redis in production, in-memory in tests); [`CacheAside`] is the typed
//! wrapper services talk to.
//!
//! # Keys and values
//!
//! - Entity key: `{kind}:{id}` (`ticket:…`, `comment:…`)
//! - List key: caller-supplied cache id
//! - Value: JSON snapshot, stored with the policy TTL (reset on every write)
//!
//! There is no read-through locking. Two concurrent misses for the same key
//! both read the store and both populate the cache; the later write wins.

use crate::entity::{Entity, EntityKind};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for cache backends.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Errors returned by cache backends.
///
/// Services never surface these: [`CacheAside`] logs them and degrades to
/// a miss or a skipped write.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Backend unreachable or command failed.
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Value could not be encoded or decoded.
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

/// Byte-level key/value cache with per-entry expiry.
pub trait EntityCache: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the backend call fails.
    fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<Vec<u8>>>> + Send;

    /// Store `value` under `key`, expiring after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the backend call fails.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> impl Future<Output = CacheResult<()>> + Send;

    /// Remove `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Backend`] if the backend call fails.
    fn delete(&self, key: &str) -> impl Future<Output = CacheResult<()>> + Send;
}

/// Backend that stores nothing. Every read misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCache;

impl EntityCache for NoopCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }
}

/// Whether and for how long one entity kind is cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// Cache reads and writes are skipped when `false`
    pub enabled: bool,
    /// Expiry applied on every write
    pub ttl: Duration,
}

impl CachePolicy {
    /// Default expiry (5 minutes).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    /// Caching on with the given TTL.
    #[must_use]
    pub const fn enabled(ttl: Duration) -> Self {
        Self { enabled: true, ttl }
    }

    /// Caching off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            ttl: Self::DEFAULT_TTL,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::enabled(Self::DEFAULT_TTL)
    }
}

/// Cache key of a single entity: `{kind}:{id}`.
///
/// # Examples
///
/// ```
/// use ticketdesk_core::cache::entity_key;
/// use ticketdesk_core::{Ticket, TicketId};
///
/// let id = TicketId::new();
/// assert_eq!(entity_key::<Ticket>(id), format!("ticket:{id}"));
/// ```
#[must_use]
pub fn entity_key<E: Entity>(id: E::Id) -> String {
    format!("{}:{id}", E::KIND)
}

/// Typed cache-aside wrapper around an [`EntityCache`] backend.
///
/// Every backend failure is logged at `warn` and counted, then treated as a
/// miss (reads) or ignored (writes and invalidations).
pub struct CacheAside<C> {
    backend: Arc<C>,
    policy: CachePolicy,
}

impl<C> Clone for CacheAside<C> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            policy: self.policy,
        }
    }
}

impl<C: EntityCache> CacheAside<C> {
    /// Wrap `backend` with `policy`.
    #[must_use]
    pub const fn new(backend: Arc<C>, policy: CachePolicy) -> Self {
        Self { backend, policy }
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Underlying backend.
    #[must_use]
    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Cached snapshot of the entity with `id`, if any.
    pub async fn get<E: Entity>(&self, id: E::Id) -> Option<E> {
        if !self.policy.enabled {
            return None;
        }
        let key = entity_key::<E>(id);
        self.read(E::KIND, &key).await
    }

    /// Store a snapshot of `entity` with the policy TTL.
    pub async fn put<E: Entity>(&self, entity: &E) {
        if !self.policy.enabled {
            return;
        }
        let key = entity_key::<E>(entity.id());
        self.write(E::KIND, &key, entity).await;
    }

    /// Drop the cached snapshot of the entity with `id`.
    pub async fn invalidate<E: Entity>(&self, id: E::Id) {
        if !self.policy.enabled {
            return;
        }
        let key = entity_key::<E>(id);
        self.evict(E::KIND, &key).await;
    }

    /// Cached list stored under `cache_id`, if any.
    pub async fn get_list<E: Entity>(&self, cache_id: &str) -> Option<Vec<E>> {
        if !self.policy.enabled {
            return None;
        }
        self.read(E::KIND, cache_id).await
    }

    /// Store `entities` under `cache_id` with the policy TTL.
    pub async fn put_list<E: Entity>(&self, cache_id: &str, entities: &[E]) {
        if !self.policy.enabled {
            return;
        }
        self.write(E::KIND, cache_id, entities).await;
    }

    async fn read<T: DeserializeOwned>(&self, kind: EntityKind, key: &str) -> Option<T> {
        let bytes = match self.backend.get(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                metrics::counter!("cache.miss", "kind" => kind.as_str()).increment(1);
                tracing::debug!(%kind, key, "Cache miss");
                return None;
            }
            Err(e) => {
                metrics::counter!("cache.error", "kind" => kind.as_str()).increment(1);
                tracing::warn!(%kind, key, error = %e, "Cache read failed, falling back to store");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                metrics::counter!("cache.hit", "kind" => kind.as_str()).increment(1);
                tracing::debug!(%kind, key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                metrics::counter!("cache.error", "kind" => kind.as_str()).increment(1);
                tracing::warn!(%kind, key, error = %e, "Undecodable cache entry, evicting");
                self.evict(kind, key).await;
                None
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, kind: EntityKind, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%kind, key, error = %e, "Failed to encode cache entry");
                return;
            }
        };

        if let Err(e) = self.backend.set(key, bytes, self.policy.ttl).await {
            metrics::counter!("cache.error", "kind" => kind.as_str()).increment(1);
            tracing::warn!(%kind, key, error = %e, "Cache write failed");
        }
    }

    async fn evict(&self, kind: EntityKind, key: &str) {
        if let Err(e) = self.backend.delete(key).await {
            metrics::counter!("cache.error", "kind" => kind.as_str()).increment(1);
            tracing::warn!(%kind, key, error = %e, "Cache invalidation failed");
        }
    }
}
