pub use crate::builder::TtlLruBuilder;
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::ds::{IntrusiveList, Linked, Links, ListTag, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::TtlLruMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
#[cfg(feature = "concurrency")]
pub use crate::policy::concurrent::ConcurrentTtlLruCache;
pub use crate::policy::ttl_lru::{EvictCallback, TtlLruCache};
