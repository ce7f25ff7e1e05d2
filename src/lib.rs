//! lrupool: a bounded LRU cache with optional per-entry TTL, built on a
//! fixed pool of arena nodes so that steady-state add/evict cycles never
//! allocate.
//!
//! - [`ds`]: the slot arena and the intrusive list threaded through it.
//! - [`policy::ttl_lru`]: the cache itself.
//! - [`builder`]: configuration surface.
//! - [`clock`]: time sources for expiry.

pub mod builder;
pub mod clock;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
