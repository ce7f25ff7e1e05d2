//! Error types for lrupool.
//!
//! - [`ConfigError`]: returned when a cache cannot be constructed from the
//!   given parameters (zero capacity, or more nodes than can be allocated).
//! - [`InvariantError`]: returned by `check_invariants` when the index, the
//!   eviction list, and the node pool disagree.
//!
//! ```
//! use lrupool::error::ConfigError;
//! use lrupool::policy::ttl_lru::TtlLruCache;
//!
//! let cache: Result<TtlLruCache<u64, String>, ConfigError> = TtlLruCache::try_new(16, None);
//! assert!(cache.is_ok());
//!
//! let bad = TtlLruCache::<u64, String>::try_new(0, None);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Describes the first broken link, count or ownership found by
/// [`TtlLruCache::check_invariants`](crate::policy::ttl_lru::TtlLruCache::check_invariants)
/// or [`IntrusiveList::check_invariants`](crate::ds::IntrusiveList::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Why a cache could not be built. Returned by the `try_` constructors of
/// [`TtlLruCache`](crate::policy::ttl_lru::TtlLruCache) and by
/// [`TtlLruBuilder::try_build`](crate::builder::TtlLruBuilder::try_build).
///
/// ```
/// use lrupool::policy::ttl_lru::TtlLruCache;
///
/// let err = TtlLruCache::<u64, u64>::try_new(0, None).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }

    /// Error for a rejected cache capacity.
    pub(crate) fn capacity(given: usize) -> Self {
        Self::new(format!("capacity must be > 0, got {given}"))
    }

    /// Error for a capacity whose node pool cannot be allocated.
    pub(crate) fn capacity_unallocatable(given: usize) -> Self {
        Self::new(format!("capacity {given} exceeds what the node pool can allocate"))
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
