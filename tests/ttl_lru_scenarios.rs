// ==============================================
// TTL LRU SCENARIO TESTS (integration)
// ==============================================
//
// End-to-end behaviour through the public API only: capacity eviction,
// recency, lazy expiry, resize, purge, and callback accounting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use lrupool::prelude::*;

type Seen = Arc<Mutex<Vec<(u32, String)>>>;

fn recording_cache(
    capacity: usize,
    default_ttl: Duration,
) -> (TtlLruCache<u32, String, ManualClock>, ManualClock, Seen) {
    let clock = ManualClock::new();
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    let cache = TtlLruBuilder::new(capacity)
        .default_ttl(default_ttl)
        .on_evict(move |k: &u32, v: &String| sink.lock().unwrap().push((*k, v.clone())))
        .clock(clock.clone())
        .build();
    (cache, clock, seen)
}

// ==============================================
// Capacity Eviction
// ==============================================

mod capacity {
    use super::*;

    #[test]
    fn third_add_on_capacity_two_evicts_first_key() {
        let (mut cache, _, seen) = recording_cache(2, Duration::ZERO);
        assert!(!cache.add(1, "a".into()));
        assert!(!cache.add(2, "b".into()));
        assert!(cache.add(3, "c".into()));

        assert!(!cache.contains(&1));
        assert_eq!(cache.keys(), vec![2, 3]);
        assert_eq!(*seen.lock().unwrap(), vec![(1, "a".to_string())]);
    }

    #[test]
    fn len_never_exceeds_capacity() {
        let (mut cache, _, _) = recording_cache(5, Duration::ZERO);
        for i in 0..100 {
            cache.add(i % 17, i.to_string());
            assert!(cache.len() <= cache.capacity());
            assert_eq!(cache.keys().len(), cache.len());
        }
        cache.check_invariants().unwrap();
    }

    #[test]
    fn touched_key_survives_next_eviction() {
        let (mut cache, _, _) = recording_cache(3, Duration::ZERO);
        cache.add(1, "a".into());
        cache.add(2, "b".into());
        cache.add(3, "c".into());

        assert!(!cache.add(1, "A".into()));
        assert_eq!(cache.len(), 3);

        assert!(cache.add(4, "d".into()));
        assert!(!cache.contains(&2));
        assert_eq!(cache.get(&1).map(String::as_str), Some("A"));
    }
}

// ==============================================
// Lazy Expiry
// ==============================================

mod expiry {
    use super::*;

    #[test]
    fn expired_entry_reads_as_miss_but_still_counts() {
        let (mut cache, clock, _) = recording_cache(2, Duration::from_millis(10));
        cache.add(1, "a".into());
        clock.advance(Duration::from_millis(15));

        assert_eq!(cache.get(&1), None);
        assert!(!cache.contains(&1));
        assert_eq!(cache.len(), 1);

        assert!(cache.remove(&1));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn wall_clock_expiry() {
        let mut cache: TtlLruCache<u32, &str> =
            TtlLruCache::try_with_expire(2, Duration::from_millis(10), None).unwrap();
        cache.add(1, "a");
        thread::sleep(Duration::from_millis(15));

        assert_eq!(cache.get(&1), None);
        assert!(!cache.contains(&1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entries_are_evicted_in_lru_order() {
        let (mut cache, clock, seen) = recording_cache(2, Duration::ZERO);
        cache.add_with_expire(1, "a".into(), Duration::from_millis(1));
        cache.add(2, "b".into());
        clock.advance(Duration::from_millis(2));

        assert_eq!(cache.get_oldest().map(|(k, _)| *k), Some(1));
        assert!(cache.add(3, "c".into()));
        assert_eq!(seen.lock().unwrap()[0].0, 1);
    }
}

// ==============================================
// Resize and Purge
// ==============================================

mod resize_purge {
    use super::*;

    #[test]
    fn shrink_to_one_keeps_newest() {
        let (mut cache, _, seen) = recording_cache(2, Duration::ZERO);
        cache.add(1, "a".into());
        cache.add(2, "b".into());

        assert_eq!(cache.resize(1), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.keys(), vec![2]);
        assert_eq!(seen.lock().unwrap().len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn grow_then_fill_uses_new_capacity() {
        let (mut cache, _, seen) = recording_cache(2, Duration::ZERO);
        assert_eq!(cache.resize(5), 0);
        for i in 0..5 {
            assert!(!cache.add(i, i.to_string()));
        }
        assert_eq!(cache.len(), 5);
        assert!(seen.lock().unwrap().is_empty());
        cache.check_invariants().unwrap();
    }

    #[test]
    fn purge_fires_once_per_present_key() {
        let (mut cache, clock, seen) = recording_cache(8, Duration::from_millis(5));
        for i in 0..6 {
            cache.add(i, format!("v{i}"));
        }
        clock.advance(Duration::from_millis(10));
        cache.remove(&0);
        seen.lock().unwrap().clear();

        cache.purge();
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.pool_len(), 8);

        let mut counts: HashMap<u32, usize> = HashMap::new();
        for (k, _) in seen.lock().unwrap().iter() {
            *counts.entry(*k).or_default() += 1;
        }
        assert_eq!(counts.len(), 5);
        assert!(counts.values().all(|&n| n == 1));
        cache.check_invariants().unwrap();
    }
}

// ==============================================
// Callback Accounting
// ==============================================
//
// Every entry that ever enters the cache leaves through the callback exactly
// once, whatever the reason.

mod callback_accounting {
    use super::*;

    #[test]
    fn every_departure_is_reported_once() {
        let (mut cache, _, seen) = recording_cache(4, Duration::ZERO);
        let mut inserted = 0usize;
        for i in 0..20u32 {
            if !cache.contains(&i) {
                inserted += 1;
            }
            cache.add(i, i.to_string());
        }
        cache.remove(&19);
        cache.remove_oldest();
        cache.resize(1);
        cache.purge();

        assert_eq!(seen.lock().unwrap().len(), inserted);
        assert!(cache.is_empty());
    }
}
