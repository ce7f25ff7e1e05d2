//! # Pooled LRU Cache with Lazy TTL Expiry
//!
//! A bounded, single-threaded key → value cache. Entries are ordered by
//! recency and the least recently used one is evicted when the cache is full.
//! Each entry may carry an absolute expiry instant which is checked lazily on
//! read; nothing sweeps expired entries in the background.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                       TtlLruCache<K, V, C>                           │
//!   │                                                                      │
//!   │   index: FxHashMap<K, SlotId>         clock: C  (expiry source)      │
//!   │        │                                                             │
//!   │        ▼                                                             │
//!   │   arena: SlotArena<Node<K, V>>   (exactly `capacity` nodes)          │
//!   │   ┌──────┬──────┬──────┬──────┬──────┐                               │
//!   │   │ id_0 │ id_1 │ id_2 │ id_3 │ id_4 │   Node { entry, links }       │
//!   │   └──────┴──────┴──────┴──────┴──────┘                               │
//!   │                                                                      │
//!   │   evict_list (IntrusiveList)        pool (IntrusiveList)             │
//!   │   head ─► [2] ◄──► [0] ◄──► [4]     head ─► [1] ◄──► [3]             │
//!   │           MRU               LRU             blank nodes              │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both lists thread through the same arena. Adding a new key pops a blank
//! node from the pool, fills it, and links it at the front of the eviction
//! list. Removing or evicting a key empties the node and links it back into
//! the pool. In steady state no operation touches the allocator.
//!
//! ## Invariants
//!
//! - `len() + pool_len() == capacity()` after every call.
//! - `index.len() == len()`, and every indexed handle is linked into the
//!   eviction list with a matching key.
//! - Every node is in exactly one list. Pool nodes hold no entry.
//! - The eviction list is in strict recency order, front = most recent.
//!
//! ## Expiry
//!
//! `add_with_expire(k, v, ttl)` sets the expiry to `now + ttl` when `ttl` is
//! non-zero, otherwise `now + default_ttl` when the default is non-zero,
//! otherwise the entry never expires. An expired entry reads as a miss from
//! `get`, `peek`, and `contains` but keeps its slot and position until it is
//! removed or evicted. Reads never extend an expiry.
//!
//! ## Eviction callback
//!
//! The optional callback runs synchronously, inline, once for every entry that
//! leaves the cache: explicit `remove`, `remove_oldest`, capacity eviction on
//! `add`, a shrinking `resize`, and `purge`. Replacing the value of an existing
//! key does not fire it. The callback cannot reach the cache it is attached to.
//!
//! ## Performance
//!
//! | Operation                              | Time          |
//! |----------------------------------------|---------------|
//! | `add`, `get`, `peek`, `contains`       | O(1) avg      |
//! | `remove`, `remove_oldest`, `get_oldest`| O(1) avg      |
//! | `keys`, `purge`                        | O(len)        |
//! | `resize`                               | O(|Δ|)        |
//!
//! ## Thread Safety
//!
//! Not thread-safe. Wrap the whole cache in one mutex for shared use (see
//! `ConcurrentTtlLruCache` behind the `concurrency` feature).
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use lrupool::policy::ttl_lru::TtlLruCache;
//!
//! let mut cache = TtlLruCache::try_new(2, None).unwrap();
//! assert!(!cache.add(1, "a"));
//! assert!(!cache.add(2, "b"));
//! assert!(cache.add(3, "c"));
//!
//! assert_eq!(cache.get(&1), None);
//! assert_eq!(cache.keys(), vec![2, 3]);
//!
//! cache.add_with_expire(4, "d", Duration::from_secs(60));
//! assert_eq!(cache.peek(&4), Some(&"d"));
//! ```

use std::collections::TryReserveError;
use std::fmt;
use std::hash::Hash;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::ds::intrusive_list::{IntrusiveList, Linked, Links, ListTag};
use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::TtlLruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::TtlLruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsSnapshotProvider, TtlLruMetricsReadRecorder,
    TtlLruMetricsRecorder,
};

/// Hook invoked with every entry that leaves the cache.
pub type EvictCallback<K, V> = Box<dyn FnMut(&K, &V) + Send>;

const EVICT_TAG: ListTag = ListTag::new(0);
const POOL_TAG: ListTag = ListTag::new(1);

struct Entry<K, V> {
    key: K,
    value: V,
    expires_at: Option<Instant>,
}

impl<K, V> Entry<K, V> {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

/// Arena node. `entry` is `None` while the node sits in the pool.
struct Node<K, V> {
    entry: Option<Entry<K, V>>,
    links: Links,
}

impl<K, V> Node<K, V> {
    fn blank() -> Self {
        Self {
            entry: None,
            links: Links::default(),
        }
    }
}

impl<K, V> Linked for Node<K, V> {
    #[inline]
    fn links(&self) -> &Links {
        &self.links
    }

    #[inline]
    fn links_mut(&mut self) -> &mut Links {
        &mut self.links
    }
}

enum Lookup<'a, K, V> {
    Missing,
    Expired,
    Fresh(SlotId, &'a Entry<K, V>),
}

/// Bounded LRU cache with optional per-entry TTL over a fixed node pool.
pub struct TtlLruCache<K, V, C = MonotonicClock> {
    capacity: usize,
    default_ttl: Duration,
    index: FxHashMap<K, SlotId>,
    arena: SlotArena<Node<K, V>>,
    evict_list: IntrusiveList,
    pool: IntrusiveList,
    on_evict: Option<EvictCallback<K, V>>,
    clock: C,
    #[cfg(feature = "metrics")]
    metrics: TtlLruMetrics,
}

impl<K, V> TtlLruCache<K, V, MonotonicClock>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache whose entries never expire unless added with a TTL.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `capacity` is 0.
    pub fn try_new(
        capacity: usize,
        on_evict: Option<EvictCallback<K, V>>,
    ) -> Result<Self, ConfigError> {
        Self::try_with_clock(capacity, Duration::ZERO, on_evict, MonotonicClock)
    }

    /// Creates a cache that applies `default_ttl` to entries added without
    /// their own TTL. A zero `default_ttl` disables default expiry.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `capacity` is 0.
    pub fn try_with_expire(
        capacity: usize,
        default_ttl: Duration,
        on_evict: Option<EvictCallback<K, V>>,
    ) -> Result<Self, ConfigError> {
        Self::try_with_clock(capacity, default_ttl, on_evict, MonotonicClock)
    }
}

impl<K, V, C> TtlLruCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates a cache reading time from `clock`.
    ///
    /// All `capacity` nodes are allocated here and parked in the pool.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when `capacity` is 0 or when the index and
    /// node pool for `capacity` entries cannot be allocated.
    pub fn try_with_clock(
        capacity: usize,
        default_ttl: Duration,
        on_evict: Option<EvictCallback<K, V>>,
        clock: C,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            warn!(capacity, "rejected cache configuration");
            return Err(ConfigError::capacity(capacity));
        }

        let mut cache = Self {
            capacity,
            default_ttl,
            index: FxHashMap::default(),
            arena: SlotArena::new(),
            evict_list: IntrusiveList::new(EVICT_TAG),
            pool: IntrusiveList::new(POOL_TAG),
            on_evict,
            clock,
            #[cfg(feature = "metrics")]
            metrics: TtlLruMetrics::default(),
        };
        if let Err(err) = cache.try_reserve_nodes(capacity) {
            warn!(capacity, error = %err, "rejected cache configuration");
            return Err(ConfigError::capacity_unallocatable(capacity));
        }
        cache.rebalance_pool();
        debug!(capacity, default_ttl = ?default_ttl, "created ttl lru cache");
        Ok(cache)
    }

    /// Number of entries currently held, expired ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.evict_list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.evict_list.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of blank nodes waiting in the pool.
    #[inline]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    #[inline]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Adds or updates `key` using the default TTL.
    ///
    /// Returns `true` if the least recently used entry was evicted to make room.
    #[inline]
    pub fn add(&mut self, key: K, value: V) -> bool {
        self.add_with_expire(key, value, Duration::ZERO)
    }

    /// Adds or updates `key` with its own TTL (`Duration::ZERO` falls back to
    /// the default TTL).
    ///
    /// Updating an existing key replaces its value and expiry, promotes it to
    /// most recently used, and returns `false`. A new key on a full cache
    /// evicts the least recently used entry first and returns `true`.
    pub fn add_with_expire(&mut self, key: K, value: V, ttl: Duration) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        let expires_at = self.expiry_for(ttl);

        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();

            if let Some(entry) = self.arena.get_mut(id).and_then(|node| node.entry.as_mut()) {
                entry.value = value;
                entry.expires_at = expires_at;
            }
            self.evict_list.move_to_front(&mut self.arena, id);
            return false;
        }

        if self.capacity == 0 {
            return false;
        }

        let evicted = self.evict_list.len() >= self.capacity;
        if evicted {
            #[cfg(feature = "metrics")]
            self.metrics.record_evict_call();

            if self.evict_oldest().is_some() {
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
            }
        }

        // Cannot be empty while `len + pool_len == capacity` holds.
        let Some(id) = self.pool.pop_front(&mut self.arena) else {
            return evicted;
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        if let Some(node) = self.arena.get_mut(id) {
            node.entry = Some(Entry {
                key: key.clone(),
                value,
                expires_at,
            });
        }
        self.evict_list.push_handle_front(&mut self.arena, id);
        self.index.insert(key, id);
        evicted
    }

    /// Returns the value for `key` and promotes it to most recently used.
    ///
    /// An expired entry reads as a miss and is left in place.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let now = self.clock.now();
        let id = match self.lookup(key, now) {
            Lookup::Fresh(id, _) => id,
            Lookup::Expired => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_expired();
                return None;
            },
            Lookup::Missing => {
                #[cfg(feature = "metrics")]
                self.metrics.record_get_miss();
                return None;
            },
        };

        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();

        self.evict_list.move_to_front(&mut self.arena, id);
        self.entry(id).map(|entry| &entry.value)
    }

    /// Returns `true` if `key` is present and not expired. Recency is untouched.
    pub fn contains(&self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_contains_call();

        let fresh = matches!(self.lookup(key, self.clock.now()), Lookup::Fresh(..));

        #[cfg(feature = "metrics")]
        if fresh {
            (&self.metrics).record_contains_hit();
        }

        fresh
    }

    /// Returns the value for `key` without touching recency.
    #[inline]
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.peek_with_expire_time(key).map(|(value, _)| value)
    }

    /// Returns the value and its expiry instant (`None` = never expires)
    /// without touching recency.
    pub fn peek_with_expire_time(&self, key: &K) -> Option<(&V, Option<Instant>)> {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();

        match self.lookup(key, self.clock.now()) {
            Lookup::Fresh(_, entry) => {
                #[cfg(feature = "metrics")]
                (&self.metrics).record_peek_hit();
                Some((&entry.value, entry.expires_at))
            },
            Lookup::Expired => {
                #[cfg(feature = "metrics")]
                (&self.metrics).record_peek_expired();
                None
            },
            Lookup::Missing => None,
        }
    }

    /// Removes `key`, firing the eviction callback. Returns whether it was present.
    ///
    /// Expired entries are removed like any other.
    pub fn remove(&mut self, key: &K) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();

        let Some(&id) = self.index.get(key) else {
            return false;
        };
        let removed = self.release(id).is_some();

        #[cfg(feature = "metrics")]
        if removed {
            self.metrics.record_remove_found();
        }

        removed
    }

    /// Removes and returns the least recently used entry, firing the callback.
    pub fn remove_oldest(&mut self) -> Option<(K, V)> {
        #[cfg(feature = "metrics")]
        self.metrics.record_pop_oldest_call();

        let removed = self.evict_oldest();

        #[cfg(feature = "metrics")]
        if removed.is_some() {
            self.metrics.record_pop_oldest_found();
        }

        removed
    }

    /// Returns the least recently used entry without removing it.
    ///
    /// No expiry check is applied.
    pub fn get_oldest(&self) -> Option<(&K, &V)> {
        let id = self.evict_list.back()?;
        self.entry(id).map(|entry| (&entry.key, &entry.value))
    }

    /// Keys from oldest to newest, expired entries included.
    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        keys.extend(self.iter().map(|(key, _)| key.clone()));
        keys
    }

    /// Iterates `(&K, &V)` from oldest to newest, expired entries included.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.evict_list
            .iter_back(&self.arena)
            .filter_map(|(_, node)| node.entry.as_ref().map(|e| (&e.key, &e.value)))
    }

    /// Changes the capacity and returns how many entries were evicted.
    ///
    /// Shrinking evicts least recently used entries (firing the callback for
    /// each) until the cache fits, then frees the surplus blank nodes. Growing
    /// allocates blank nodes so the new capacity is usable immediately.
    /// `resize(0)` empties the cache and makes `add` a no-op.
    ///
    /// Growth that cannot be allocated is refused: the capacity stays as it
    /// was and 0 is returned.
    pub fn resize(&mut self, new_capacity: usize) -> usize {
        #[cfg(feature = "metrics")]
        self.metrics.record_resize();

        let old_capacity = self.capacity;
        if new_capacity > old_capacity {
            if let Err(err) = self.try_reserve_nodes(new_capacity) {
                warn!(old_capacity, new_capacity, error = %err, "refused cache growth");
                return 0;
            }
        }

        let mut evicted = 0usize;
        while self.evict_list.len() > new_capacity {
            if self.evict_oldest().is_none() {
                break;
            }
            evicted += 1;

            #[cfg(feature = "metrics")]
            self.metrics.record_evicted_entry();
        }

        self.capacity = new_capacity;
        self.rebalance_pool();

        debug!(old_capacity, new_capacity, evicted, "resized ttl lru cache");
        evicted
    }

    /// Evicts every entry (firing the callback once per key, oldest first) and
    /// rebuilds the pool with `capacity` blank nodes.
    pub fn purge(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        let mut evicted = 0usize;
        while let Some(id) = self.evict_list.back() {
            if self.release(id).is_none() {
                break;
            }
            evicted += 1;
        }

        self.index.clear();
        self.arena.clear();
        self.evict_list.init();
        self.pool.init();
        self.rebalance_pool();

        debug!(evicted, capacity = self.capacity, "purged ttl lru cache");
    }

    /// Verifies the index, both lists, and the pool against each other.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.evict_list.check_invariants(&self.arena)?;
        self.pool.check_invariants(&self.arena)?;

        if self.evict_list.len() + self.pool.len() != self.capacity {
            return Err(InvariantError::new(format!(
                "len {} + pool {} != capacity {}",
                self.evict_list.len(),
                self.pool.len(),
                self.capacity
            )));
        }
        if self.arena.len() != self.capacity {
            return Err(InvariantError::new(format!(
                "arena holds {} nodes, capacity is {}",
                self.arena.len(),
                self.capacity
            )));
        }
        if self.index.len() != self.evict_list.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys, eviction list has {} nodes",
                self.index.len(),
                self.evict_list.len()
            )));
        }
        for (key, &id) in &self.index {
            if !self.evict_list.contains(&self.arena, id) {
                return Err(InvariantError::new(format!(
                    "indexed {id:?} is not in the eviction list"
                )));
            }
            match self.entry(id) {
                Some(entry) if entry.key == *key => {},
                _ => {
                    return Err(InvariantError::new(format!(
                        "indexed {id:?} holds a different key"
                    )));
                },
            }
        }
        if let Some((id, _)) = self
            .pool
            .iter(&self.arena)
            .find(|(_, node)| node.entry.is_some())
        {
            return Err(InvariantError::new(format!(
                "pool node {id:?} still holds an entry"
            )));
        }
        Ok(())
    }

    fn expiry_for(&self, ttl: Duration) -> Option<Instant> {
        let ttl = if !ttl.is_zero() {
            ttl
        } else if !self.default_ttl.is_zero() {
            self.default_ttl
        } else {
            return None;
        };
        // Overflowing instants are treated as "never expires".
        self.clock.now().checked_add(ttl)
    }

    fn lookup(&self, key: &K, now: Instant) -> Lookup<'_, K, V> {
        let Some(&id) = self.index.get(key) else {
            return Lookup::Missing;
        };
        match self.entry(id) {
            Some(entry) if !entry.is_expired(now) => Lookup::Fresh(id, entry),
            Some(_) => Lookup::Expired,
            None => Lookup::Missing,
        }
    }

    #[inline]
    fn entry(&self, id: SlotId) -> Option<&Entry<K, V>> {
        self.arena.get(id).and_then(|node| node.entry.as_ref())
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let id = self.evict_list.back()?;
        let evicted = self.release(id);
        if evicted.is_some() {
            trace!(slot = id.index(), "evicted least recently used entry");
        }
        evicted
    }

    /// Unlinks `id` from the eviction list, parks the emptied node in the
    /// pool, drops the index entry and fires the callback.
    fn release(&mut self, id: SlotId) -> Option<(K, V)> {
        if !self.evict_list.remove(&mut self.arena, id) {
            return None;
        }
        let entry = self.arena.get_mut(id).and_then(|node| node.entry.take());
        self.pool.push_handle_front(&mut self.arena, id);

        let entry = entry?;
        self.index.remove(&entry.key);
        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(&entry.key, &entry.value);
        }
        Some((entry.key, entry.value))
    }

    /// Reserves arena slots and index buckets for `target` entries in total.
    fn try_reserve_nodes(&mut self, target: usize) -> Result<(), TryReserveError> {
        self.arena
            .try_reserve(target.saturating_sub(self.arena.len()))?;
        self.index
            .try_reserve(target.saturating_sub(self.index.len()))
    }

    /// Grows or trims the pool so that `len + pool_len == capacity`.
    fn rebalance_pool(&mut self) {
        let target = self.capacity.saturating_sub(self.evict_list.len());
        while self.pool.len() > target {
            match self.pool.pop_front(&mut self.arena) {
                Some(id) => {
                    self.arena.remove(id);
                },
                None => break,
            }
        }
        while self.pool.len() < target {
            self.pool.push_front(&mut self.arena, Node::blank());
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C> TtlLruCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    pub fn metrics_snapshot(&self) -> TtlLruMetricsSnapshot {
        TtlLruMetricsSnapshot {
            get_calls: self.metrics.get_calls,
            get_hits: self.metrics.get_hits,
            get_misses: self.metrics.get_misses,
            get_expired: self.metrics.get_expired,
            insert_calls: self.metrics.insert_calls,
            insert_updates: self.metrics.insert_updates,
            insert_new: self.metrics.insert_new,
            evict_calls: self.metrics.evict_calls,
            evicted_entries: self.metrics.evicted_entries,
            remove_calls: self.metrics.remove_calls,
            remove_found: self.metrics.remove_found,
            pop_oldest_calls: self.metrics.pop_oldest_calls,
            pop_oldest_found: self.metrics.pop_oldest_found,
            resize_calls: self.metrics.resize_calls,
            clear_calls: self.metrics.clear_calls,
            peek_calls: self.metrics.peek_calls.get(),
            peek_hits: self.metrics.peek_hits.get(),
            peek_expired: self.metrics.peek_expired.get(),
            contains_calls: self.metrics.contains_calls.get(),
            contains_hits: self.metrics.contains_hits.get(),
            cache_len: self.len(),
            pool_len: self.pool_len(),
            capacity: self.capacity,
        }
    }
}

#[cfg(feature = "metrics")]
impl<K, V, C> MetricsSnapshotProvider<TtlLruMetricsSnapshot> for TtlLruCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    fn snapshot(&self) -> TtlLruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V, C> fmt::Debug for TtlLruCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlLruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.evict_list.len())
            .field("pool_len", &self.pool.len())
            .field("default_ttl", &self.default_ttl)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
