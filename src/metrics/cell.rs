use std::cell::Cell;

/// Counter that can be bumped through `&self`.
///
/// Used for reads such as `peek` and `contains` that must not take `&mut self`.
/// `Cell<u64>` is `Send` but not `Sync`, which matches the cache: shared use
/// across threads goes through one external mutex.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }
}
