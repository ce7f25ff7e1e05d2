#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod ttl_lru;
