//! Walkthrough of the TTL-aware LRU cache.
//!
//! Run with: cargo run --example basic_ttl_lru
//! Set `RUST_LOG=lrupool=trace` to see every eviction.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lrupool::builder::TtlLruBuilder;
use lrupool::clock::ManualClock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "lrupool=debug".into()))
        .with(fmt::layer())
        .init();

    println!("=== TTL-LRU Examples ===\n");

    // Example 1: plain LRU with an eviction callback
    println!("1. LRU eviction");
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);
    let mut cache = TtlLruBuilder::new(2)
        .on_evict(move |key: &u32, value: &String| {
            sink.lock().unwrap().push(format!("{key}={value}"));
        })
        .build();

    cache.add(1, "alpha".to_string());
    cache.add(2, "beta".to_string());

    // Touch key 1 so key 2 becomes the oldest
    if let Some(value) = cache.get(&1) {
        println!("   hit 1: {value}");
    }

    let did_evict = cache.add(3, "gamma".to_string());
    println!("   add 3 evicted? {did_evict}");
    println!("   contains 2? {}", cache.contains(&2));
    println!("   evicted: {:?}", evicted.lock().unwrap());
    println!();

    // Example 2: per-entry expiry on a manual clock
    println!("2. TTL expiry");
    let clock = ManualClock::new();
    let mut sessions = TtlLruBuilder::new(4)
        .default_ttl(Duration::from_secs(60))
        .clock(clock.clone())
        .build();

    sessions.add("alice", 1u32);
    sessions.add_with_expire("bob", 2u32, Duration::from_secs(5));

    clock.advance(Duration::from_secs(10));
    println!("   alice fresh? {}", sessions.contains(&"alice"));
    println!("   bob fresh?   {}", sessions.contains(&"bob"));
    println!("   still stored: {:?}", sessions.keys());
    println!();

    // Example 3: resize and purge
    println!("3. Resize and purge");
    let mut small = TtlLruBuilder::new(4).build();
    for i in 0..4u32 {
        small.add(i, i * 10);
    }
    let dropped = small.resize(2);
    println!("   resize(2) evicted {dropped}, keys now {:?}", small.keys());
    small.purge();
    println!("   after purge: len={} pool={}", small.len(), small.pool_len());
}

// Expected output:
// 1. LRU eviction
//    hit 1: alpha
//    add 3 evicted? true
//    contains 2? false
//    evicted: ["2=beta"]
//
// 2. TTL expiry
//    alice fresh? true
//    bob fresh?   false
//    still stored: ["alice", "bob"]
//
// 3. Resize and purge
//    resize(2) evicted 2, keys now [2, 3]
//    after purge: len=0 pool=2
