//! Builder for [`TtlLruCache`].
//!
//! Collects the handful of construction parameters (capacity, default TTL,
//! eviction callback, clock) and validates them in one place.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::time::Duration;
//! use lrupool::builder::TtlLruBuilder;
//!
//! let evicted = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&evicted);
//!
//! let mut cache = TtlLruBuilder::new(2)
//!     .default_ttl(Duration::from_secs(30))
//!     .on_evict(move |_key: &u64, _value: &String| {
//!         counter.fetch_add(1, Ordering::Relaxed);
//!     })
//!     .try_build()
//!     .unwrap();
//!
//! cache.add(1, "one".to_string());
//! cache.add(2, "two".to_string());
//! cache.add(3, "three".to_string());
//! assert_eq!(evicted.load(Ordering::Relaxed), 1);
//! ```

use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::error::ConfigError;
#[cfg(feature = "concurrency")]
use crate::policy::concurrent::ConcurrentTtlLruCache;
use crate::policy::ttl_lru::{EvictCallback, TtlLruCache};

/// Builder for [`TtlLruCache`] and, with `concurrency`, its shared wrapper.
pub struct TtlLruBuilder<K, V, C = MonotonicClock> {
    capacity: usize,
    default_ttl: Duration,
    on_evict: Option<EvictCallback<K, V>>,
    clock: C,
}

impl<K, V> TtlLruBuilder<K, V, MonotonicClock> {
    /// Starts a builder for a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            default_ttl: Duration::ZERO,
            on_evict: None,
            clock: MonotonicClock,
        }
    }
}

impl<K, V, C> TtlLruBuilder<K, V, C> {
    /// TTL applied to entries added without their own. Zero disables it.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Hook run synchronously for every entry that leaves the cache.
    pub fn on_evict(mut self, on_evict: impl FnMut(&K, &V) + Send + 'static) -> Self {
        self.on_evict = Some(Box::new(on_evict));
        self
    }

    /// Replaces the time source.
    pub fn clock<C2: Clock>(self, clock: C2) -> TtlLruBuilder<K, V, C2> {
        TtlLruBuilder {
            capacity: self.capacity,
            default_ttl: self.default_ttl,
            on_evict: self.on_evict,
            clock,
        }
    }
}

impl<K, V, C> TtlLruBuilder<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Builds the cache.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the capacity is 0.
    pub fn try_build(self) -> Result<TtlLruCache<K, V, C>, ConfigError> {
        TtlLruCache::try_with_clock(self.capacity, self.default_ttl, self.on_evict, self.clock)
    }

    /// Builds the cache.
    ///
    /// # Panics
    /// Panics if the configuration is invalid. See [`try_build`](Self::try_build).
    pub fn build(self) -> TtlLruCache<K, V, C> {
        match self.try_build() {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Builds a mutex-guarded cache that can be shared across threads.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the capacity is 0.
    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent(self) -> Result<ConcurrentTtlLruCache<K, V, C>, ConfigError> {
        self.try_build().map(ConcurrentTtlLruCache::from_cache)
    }
}

impl<K, V, C: fmt::Debug> fmt::Debug for TtlLruBuilder<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlLruBuilder")
            .field("capacity", &self.capacity)
            .field("default_ttl", &self.default_ttl)
            .field("on_evict", &self.on_evict.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}
