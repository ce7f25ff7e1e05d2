//! Recorder and snapshot traits.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │  get hit/miss, insert, evict, clear
//!   └──────────────┬──────────────┘
//!                  ▼
//!   ┌─────────────────────────────┐   ┌─────────────────────────────┐
//!   │   TtlLruMetricsRecorder     │   │  TtlLruMetricsReadRecorder  │
//!   │  expiry, remove, pop,       │   │  peek / contains via &self  │
//!   │  resize                     │   └─────────────────────────────┘
//!   └─────────────────────────────┘
//!
//!   Consumption:  MetricsSnapshotProvider<S>
//! ```

/// Common counters for any cache.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Counters specific to the TTL-aware LRU.
pub trait TtlLruMetricsRecorder: CoreMetricsRecorder {
    /// A `get` found the key but its expiry had passed.
    fn record_get_expired(&mut self);
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
    fn record_pop_oldest_call(&mut self);
    fn record_pop_oldest_found(&mut self);
    fn record_resize(&mut self);
}

/// Counters bumped from `&self` methods.
pub trait TtlLruMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_hit(&self);
    fn record_peek_expired(&self);
    fn record_contains_call(&self);
    fn record_contains_hit(&self);
}

/// Produces a point-in-time copy of a cache's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
