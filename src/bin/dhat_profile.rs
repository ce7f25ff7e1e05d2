//! DHAT heap profiler for lrupool.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>
//!
//! Every workload runs against a cache whose node pool was filled at
//! construction, so the per-phase block counts printed below should stay
//! flat once the cache is warm.

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::time::Duration;

use lrupool::policy::ttl_lru::TtlLruCache;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Run a hotset workload: 90% of accesses hit 10% of keys.
fn hotset_workload(cache: &mut TtlLruCache<u64, u64>, operations: usize, universe: u64, seed: u64) {
    let mut rng = XorShift64::new(seed);
    let hot_size = (universe as f64 * 0.1) as u64;

    for _ in 0..operations {
        let key = if rng.next_f64() < 0.9 {
            rng.next_u64() % hot_size
        } else {
            hot_size + (rng.next_u64() % (universe - hot_size))
        };

        if cache.get(&key).is_none() {
            cache.add(key, key);
        }
    }
}

/// Run a scan workload: sequential access pattern.
fn scan_workload(cache: &mut TtlLruCache<u64, u64>, operations: usize, universe: u64) {
    for i in 0..operations {
        let key = (i as u64) % universe;
        if cache.get(&key).is_none() {
            cache.add(key, key);
        }
    }
}

/// Run eviction churn: every add of a fresh key evicts the oldest one.
fn eviction_churn(cache: &mut TtlLruCache<u64, u64>, operations: usize, offset: u64) {
    for i in 0..operations {
        cache.add(offset + i as u64, i as u64);
    }
}

/// Short-lived entries mixed with long-lived ones.
fn ttl_mix(cache: &mut TtlLruCache<u64, u64>, operations: usize, seed: u64) {
    let mut rng = XorShift64::new(seed);
    for i in 0..operations {
        let key = rng.next_u64() % 8_192;
        let ttl = if i % 4 == 0 {
            Duration::from_micros(50)
        } else {
            Duration::ZERO
        };
        cache.add_with_expire(key, key, ttl);
        let _ = cache.peek(&(key ^ 1));
    }
}

fn report(phase: &str) {
    let stats = dhat::HeapStats::get();
    println!(
        "  {phase:<10} total_blocks={:>8} curr_blocks={:>6} curr_bytes={:>9}",
        stats.total_blocks, stats.curr_blocks, stats.curr_bytes
    );
}

fn profile_ttl_lru(default_ttl: Duration) {
    println!("=== Profiling TTL-LRU (default_ttl = {default_ttl:?}) ===");
    let capacity = 4096;
    let operations = 100_000;
    let universe = 16_384;

    let mut cache = match TtlLruCache::try_with_expire(capacity, default_ttl, None) {
        Ok(cache) => cache,
        Err(e) => panic!("{}", e),
    };
    report("construct");

    // Warm up
    for i in 0..capacity as u64 {
        cache.add(i, i);
    }
    report("warm");

    hotset_workload(&mut cache, operations, universe, 42);
    report("hotset");

    scan_workload(&mut cache, operations / 2, universe);
    report("scan");

    eviction_churn(&mut cache, operations / 4, universe);
    report("churn");

    ttl_mix(&mut cache, operations / 4, 7);
    report("ttl-mix");

    cache.resize(capacity / 2);
    cache.resize(capacity);
    report("resize");

    cache.purge();
    report("purge");

    println!("  Final size: {} (pool {})", cache.len(), cache.pool_len());
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("lrupool DHAT Heap Profiling");
    println!("===========================\n");

    profile_ttl_lru(Duration::ZERO);
    profile_ttl_lru(Duration::from_millis(5));

    println!("\n===========================");
    println!("Profiling complete. Open dhat-heap.json in DHAT viewer.");
}
