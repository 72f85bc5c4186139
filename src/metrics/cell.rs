use std::cell::Cell;

/// Counter for methods that only take `&self` (`peek`, `contains`, ...).
///
/// Not `Sync`: a cache carrying these counters can move between threads but
/// must be shared behind a `Mutex`, which is how the concurrent wrappers hold
/// it.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.set(0);
    }
}
