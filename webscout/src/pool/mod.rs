//! The lazily growing worker pool.
//!
//! Instead of starting a fixed number of threads, the pool starts with one
//! worker and hires another each time a worker claims a task:
//!
//! 1. **Workers** pull URLs from a shared channel. Each claim sends a
//!    [`WorkSignal`] before the download starts.
//! 2. **The hiring manager** owns the count of open positions and spawns one
//!    worker per signal while positions remain. With fewer URLs than the cap
//!    there is at most one idle worker; with more, exactly `max_workers` run.
//! 3. **The analyst** sums the per-task counts and prints the total once the
//!    result channel closes.
//! 4. **The controller** wires the channels and waits on the
//!    [`WorkerRoster`](roster::WorkerRoster) for every worker, including the
//!    ones hired while it was already waiting.
//!
//! All coordination goes through channels; the roster counter is the only
//! state touched from more than one thread.
use crossbeam_channel::Receiver;

use crate::config::ScoutConfig;
use crate::errors::ScoutResult;
use crate::results::PoolSummary;

mod analyst;
pub mod controller;
mod hiring;
pub mod roster;
mod worker;

pub use controller::PoolController;
pub use roster::{Shift, WorkerRoster};

/// "A worker just claimed a task"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkSignal;

/// Runs an HTTP-backed pool over `tasks`, printing counts to the console
pub fn run(config: &ScoutConfig, tasks: Receiver<String>) -> ScoutResult<PoolSummary> {
    PoolController::new(config)?.run(tasks)
}
