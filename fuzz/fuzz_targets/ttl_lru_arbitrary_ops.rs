#![no_main]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use lrupool::clock::ManualClock;
use lrupool::policy::ttl_lru::TtlLruCache;

// Fuzz arbitrary operation sequences on TtlLruCache
//
// Each pair of bytes is (op, arg). After every step the cache must satisfy
// its invariants and the callback count must equal entries that left.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = usize::from(data[0] % 32) + 1;
    let clock = ManualClock::new();
    let departed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&departed);
    let mut cache: TtlLruCache<u8, u32, ManualClock> = TtlLruCache::try_with_clock(
        capacity,
        Duration::from_millis(u64::from(data[1] % 8)),
        Some(Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        })),
        clock.clone(),
    )
    .unwrap();
    let mut entered = 0usize;

    let mut idx = 2;
    while idx + 1 < data.len() {
        let op = data[idx] % 10;
        let arg = data[idx + 1];
        idx += 2;

        match op {
            0 | 1 => {
                let was_present = cache.keys().contains(&arg);
                let full = cache.len() >= cache.capacity();
                let evicted = cache.add(arg, u32::from(arg));
                if !was_present && cache.capacity() > 0 {
                    entered += 1;
                    assert_eq!(evicted, full);
                }
            },
            2 => {
                let was_present = cache.keys().contains(&arg);
                let full = cache.len() >= cache.capacity();
                let evicted = cache.add_with_expire(arg, 0, Duration::from_millis(u64::from(arg % 5)));
                if !was_present && cache.capacity() > 0 {
                    entered += 1;
                    assert_eq!(evicted, full);
                }
            },
            3 => {
                if let Some(v) = cache.get(&arg) {
                    assert!(*v == u32::from(arg) || *v == 0);
                    assert_eq!(cache.keys().last(), Some(&arg));
                }
            },
            4 => {
                let before = cache.keys();
                let _ = cache.peek(&arg);
                let _ = cache.contains(&arg);
                assert_eq!(cache.keys(), before);
            },
            5 => {
                let was_present = cache.keys().contains(&arg);
                assert_eq!(cache.remove(&arg), was_present);
            },
            6 => {
                let oldest = cache.get_oldest().map(|(k, _)| *k);
                assert_eq!(cache.remove_oldest().map(|(k, _)| k), oldest);
            },
            7 => clock.advance(Duration::from_millis(u64::from(arg % 4))),
            8 => {
                let before = cache.len();
                let new_capacity = usize::from(arg % 40);
                let evicted = cache.resize(new_capacity);
                assert_eq!(evicted, before.saturating_sub(new_capacity));
            },
            9 => {
                cache.purge();
                assert!(cache.is_empty());
            },
            _ => unreachable!(),
        }

        assert!(cache.len() <= cache.capacity());
        assert_eq!(cache.len() + cache.pool_len(), cache.capacity());
        assert_eq!(departed.load(Ordering::Relaxed) + cache.len(), entered);
        cache.check_invariants().unwrap();
    }
});
