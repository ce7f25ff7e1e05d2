/// Point-in-time copy of a [`TtlLruCache`](crate::policy::ttl_lru::TtlLruCache)'s counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TtlLruMetricsSnapshot {
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

    pub peek_calls: u64,
    pub peek_hits: u64,
    pub peek_expired: u64,
    pub contains_calls: u64,
    pub contains_hits: u64,

    pub cache_len: usize,
    pub pool_len: usize,
    pub capacity: usize,
}

impl TtlLruMetricsSnapshot {
    /// Fraction of `get` calls that returned a value; `0.0` before any call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_handles_zero_calls() {
        let snap = TtlLruMetricsSnapshot::default();
        assert_eq!(snap.hit_rate(), 0.0);
    }

    #[test]
    fn hit_rate_is_hits_over_calls() {
        let snap = TtlLruMetricsSnapshot {
            get_calls: 4,
            get_hits: 3,
            ..Default::default()
        };
        assert!((snap.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
