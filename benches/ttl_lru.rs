use std::time::Duration;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use lrupool::policy::ttl_lru::TtlLruCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn filled(capacity: usize, default_ttl: Duration) -> TtlLruCache<u64, u64> {
    let mut cache = TtlLruCache::try_with_expire(capacity, default_ttl, None).unwrap();
    for i in 0..capacity as u64 {
        cache.add(i, i);
    }
    cache
}

fn bench_add_get(c: &mut Criterion) {
    c.bench_function("ttl_lru_add_get", |b| {
        b.iter_batched(
            || filled(1024, Duration::ZERO),
            |mut cache| {
                for i in 0..1024u64 {
                    cache.add(std::hint::black_box(i + 10_000), i);
                    let _ = std::hint::black_box(cache.get(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_eviction_churn(c: &mut Criterion) {
    c.bench_function("ttl_lru_eviction_churn", |b| {
        b.iter_batched(
            || filled(1024, Duration::ZERO),
            |mut cache| {
                for i in 0..4096u64 {
                    cache.add(std::hint::black_box(10_000 + i), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_eviction_churn_with_ttl(c: &mut Criterion) {
    c.bench_function("ttl_lru_eviction_churn_default_ttl", |b| {
        b.iter_batched(
            || filled(1024, Duration::from_secs(60)),
            |mut cache| {
                for i in 0..4096u64 {
                    cache.add(std::hint::black_box(10_000 + i), i);
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_hotset_get(c: &mut Criterion) {
    c.bench_function("ttl_lru_hotset_get", |b| {
        b.iter_batched(
            || (filled(4096, Duration::ZERO), StdRng::seed_from_u64(42)),
            |(mut cache, mut rng)| {
                for _ in 0..4096 {
                    let key = if rng.gen_bool(0.9) {
                        rng.gen_range(0..409u64)
                    } else {
                        rng.gen_range(0..16_384u64)
                    };
                    if cache.get(&key).is_none() {
                        cache.add(key, key);
                    }
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_peek(c: &mut Criterion) {
    let cache = filled(4096, Duration::from_secs(60));
    c.bench_function("ttl_lru_peek", |b| {
        b.iter(|| {
            for i in 0..4096u64 {
                let _ = std::hint::black_box(cache.peek(&std::hint::black_box(i)));
            }
        })
    });
}

fn bench_remove_oldest(c: &mut Criterion) {
    c.bench_function("ttl_lru_remove_oldest", |b| {
        b.iter_batched(
            || filled(1024, Duration::ZERO),
            |mut cache| {
                for _ in 0..1024u64 {
                    let _ = std::hint::black_box(cache.remove_oldest());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_resize_cycle(c: &mut Criterion) {
    c.bench_function("ttl_lru_resize_cycle", |b| {
        b.iter_batched(
            || filled(1024, Duration::ZERO),
            |mut cache| {
                std::hint::black_box(cache.resize(256));
                std::hint::black_box(cache.resize(1024));
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_add_get,
    bench_eviction_churn,
    bench_eviction_churn_with_ttl,
    bench_hotset_get,
    bench_peek,
    bench_remove_oldest,
    bench_resize_cycle
);
criterion_main!(benches);
