//! Optional counters for cache operations (feature `metrics`).
//!
//! Recording is split from reading: the cache writes through the recorder
//! traits in [`traits`], callers read a plain-data
//! [`TtlLruMetricsSnapshot`](snapshot::TtlLruMetricsSnapshot).

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
