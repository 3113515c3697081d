use std::time::Instant;

use crate::storage::{ReaderStatistics, SharedStatistics};

/// Adds the time between construction and drop to a statistics counter.
///
/// Recording happens on drop, so early returns through `?` are timed too.
pub struct ScopedRawTimer {
    start: Instant,
    stats: SharedStatistics,
    record: fn(&mut ReaderStatistics, u64),
}

impl ScopedRawTimer {
    pub fn new(stats: &SharedStatistics, record: fn(&mut ReaderStatistics, u64)) -> Self {
        Self { start: Instant::now(), stats: stats.clone(), record }
    }
}

impl Drop for ScopedRawTimer {
    fn drop(&mut self) {
        // a timed scope never records zero, even under a coarse clock
        let elapsed = u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX).max(1);
        if let Ok(mut stats) = self.stats.try_borrow_mut() {
            (self.record)(&mut *stats, elapsed);
        }
    }
}
