//! Records that flow out of the pool.
//!
//! Only successful tasks produce a [`TaskCount`]; failures are reported and
//! dropped, so they contribute nothing to the total. Per-worker bookkeeping
//! travels back through thread join handles as [`WorkerStats`] rather than
//! through shared counters.
use std::time::Duration;

/// One successfully scanned task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCount {
    pub count: u64,
}

/// What a single worker did before it resigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub tasks_claimed: u64,
    pub tasks_counted: u64,
    pub tasks_failed: u64,
    pub bytes_scanned: u64,
}

impl WorkerStats {
    /// Folds another worker's numbers into this one
    pub fn merge(&mut self, other: WorkerStats) {
        self.tasks_claimed += other.tasks_claimed;
        self.tasks_counted += other.tasks_counted;
        self.tasks_failed += other.tasks_failed;
        self.bytes_scanned += other.bytes_scanned;
    }
}

/// Outcome of a whole pool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolSummary {
    /// Sum of all per-task counts
    pub total: u64,
    /// Tasks that produced a count
    pub tasks_counted: u64,
    /// Tasks abandoned after a fetch or read failure
    pub tasks_failed: u64,
    /// Workers started, including the first one
    pub workers_spawned: usize,
    pub bytes_scanned: u64,
    pub elapsed: Duration,
}

impl PoolSummary {
    pub fn tasks_processed(&self) -> u64 {
        self.tasks_counted + self.tasks_failed
    }
}
