use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    CoreMetricsRecorder, TtlLruMetricsReadRecorder, TtlLruMetricsRecorder,
};

#[derive(Debug, Default)]
pub struct TtlLruMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub get_expired: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub pop_oldest_calls: u64,
    pub pop_oldest_found: u64,
    pub resize_calls: u64,
    pub clear_calls: u64,
    pub peek_calls: MetricsCell,
    pub peek_hits: MetricsCell,
    pub peek_expired: MetricsCell,
    pub contains_calls: MetricsCell,
    pub contains_hits: MetricsCell,
}

impl CoreMetricsRecorder for TtlLruMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl TtlLruMetricsRecorder for TtlLruMetrics {
    // An expired hit is reported to callers as a miss.
    fn record_get_expired(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
        self.get_expired += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    fn record_pop_oldest_call(&mut self) {
        self.pop_oldest_calls += 1;
    }

    fn record_pop_oldest_found(&mut self) {
        self.pop_oldest_found += 1;
    }

    fn record_resize(&mut self) {
        self.resize_calls += 1;
    }
}

impl TtlLruMetricsReadRecorder for &TtlLruMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_hit(&self) {
        self.peek_hits.incr();
    }

    fn record_peek_expired(&self) {
        self.peek_expired.incr();
    }

    fn record_contains_call(&self) {
        self.contains_calls.incr();
    }

    fn record_contains_hit(&self) {
        self.contains_hits.incr();
    }
}
