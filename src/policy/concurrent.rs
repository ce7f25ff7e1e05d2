//! Shared handle to a [`TtlLruCache`] behind a single `parking_lot::Mutex`.
//!
//! The core cache is single-threaded by construction. This wrapper is the
//! "external mutex" option: every call takes the one lock for its whole
//! duration, including the eviction callback. Even `peek` locks exclusively
//! because the core is not `Sync`. Values leave the lock by clone.
//!
//! ```
//! use lrupool::policy::concurrent::ConcurrentTtlLruCache;
//!
//! let cache: ConcurrentTtlLruCache<u32, String> = ConcurrentTtlLruCache::try_new(64, None).unwrap();
//! let handle = cache.clone();
//! std::thread::spawn(move || {
//!     handle.add(1, "one".to_string());
//! })
//! .join()
//! .unwrap();
//! assert_eq!(cache.get(&1).as_deref(), Some("one"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::clock::{Clock, MonotonicClock};
use crate::error::ConfigError;
use crate::policy::ttl_lru::{EvictCallback, TtlLruCache};

/// Cloneable, thread-safe handle over one [`TtlLruCache`].
pub struct ConcurrentTtlLruCache<K, V, C = MonotonicClock> {
    inner: Arc<Mutex<TtlLruCache<K, V, C>>>,
}

impl<K, V, C> Clone for ConcurrentTtlLruCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, C> fmt::Debug for ConcurrentTtlLruCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentTtlLruCache")
            .field("inner", &*cache)
            .finish()
    }
}

impl<K, V> ConcurrentTtlLruCache<K, V, MonotonicClock>
where
    K: Eq + Hash + Clone,
{
    /// See [`TtlLruCache::try_new`].
    pub fn try_new(
        capacity: usize,
        on_evict: Option<EvictCallback<K, V>>,
    ) -> Result<Self, ConfigError> {
        TtlLruCache::try_new(capacity, on_evict).map(Self::from_cache)
    }

    /// See [`TtlLruCache::try_with_expire`].
    pub fn try_with_expire(
        capacity: usize,
        default_ttl: Duration,
        on_evict: Option<EvictCallback<K, V>>,
    ) -> Result<Self, ConfigError> {
        TtlLruCache::try_with_expire(capacity, default_ttl, on_evict).map(Self::from_cache)
    }
}

impl<K, V, C> ConcurrentTtlLruCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Wraps an already configured cache.
    pub fn from_cache(cache: TtlLruCache<K, V, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    pub fn add(&self, key: K, value: V) -> bool {
        self.inner.lock().add(key, value)
    }

    pub fn add_with_expire(&self, key: K, value: V, ttl: Duration) -> bool {
        self.inner.lock().add_with_expire(key, value, ttl)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn remove(&self, key: &K) -> bool {
        self.inner.lock().remove(key)
    }

    pub fn remove_oldest(&self) -> Option<(K, V)> {
        self.inner.lock().remove_oldest()
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.lock().keys()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn resize(&self, new_capacity: usize) -> usize {
        self.inner.lock().resize(new_capacity)
    }

    pub fn purge(&self) {
        self.inner.lock().purge();
    }

    /// Runs `f` with exclusive access to the core cache.
    ///
    /// Useful for compound operations that must not interleave with other
    /// threads, such as get-or-add.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut TtlLruCache<K, V, C>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }
}

impl<K, V, C> ConcurrentTtlLruCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock,
{
    /// Returns a clone of the value and promotes the key.
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    pub fn peek(&self, key: &K) -> Option<V> {
        self.inner.lock().peek(key).cloned()
    }

    pub fn peek_with_expire_time(&self, key: &K) -> Option<(V, Option<Instant>)> {
        self.inner
            .lock()
            .peek_with_expire_time(key)
            .map(|(value, expires_at)| (value.clone(), expires_at))
    }

    pub fn get_oldest(&self) -> Option<(K, V)> {
        self.inner
            .lock()
            .get_oldest()
            .map(|(key, value)| (key.clone(), value.clone()))
    }
}
