use std::time::Duration;

/// Counters collected while a [`crate::CollapseEngine`] runs.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    /// Top-level select/collapse/propagate cycles completed.
    pub steps: u64,
    pub random_collapses: u64,
    /// Cells narrowed to a singleton by propagation alone.
    pub forced_collapses: u64,
    pub pinned_collapses: u64,
    /// Cells popped from the propagation worklist.
    pub propagation_visits: u64,
    /// Successful `intersect_narrow` calls made by propagation.
    pub narrowings: u64,
    pub elapsed: Duration,
}

impl RunMetrics {
    pub fn total_collapses(&self) -> u64 {
        self.random_collapses + self.forced_collapses + self.pinned_collapses
    }

    /// Share of collapses decided by propagation instead of a random draw.
    pub fn forced_ratio(&self) -> f64 {
        let total = self.total_collapses();
        if total > 0 {
            self.forced_collapses as f64 / total as f64
        } else {
            0.0
        }
    }
}
