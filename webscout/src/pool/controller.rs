use crossbeam_channel::{bounded, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

use super::analyst::Analyst;
use super::hiring::HiringManager;
use super::roster::WorkerRoster;
use super::worker::{Worker, WorkerKit};
use crate::config::ScoutConfig;
use crate::errors::{ScoutError, ScoutResult};
use crate::fetch::{Fetch, HttpFetcher};
use crate::report::{ConsoleReport, Report};
use crate::results::PoolSummary;
use crate::search::matcher::WordMatcher;

/// Owns the pool and its shutdown protocol.
///
/// A run starts the analyst, the hiring manager and a single worker. Every
/// task a worker claims lets the hiring manager add one more worker until
/// `max_workers` are running. When the task channel is closed and drained the
/// workers resign; once the roster is empty the controller closes the
/// shutdown channel, which stops the hiring manager, whose exit drops the
/// last result sender and lets the analyst report the total.
pub struct PoolController {
    max_workers: usize,
    matcher: Arc<WordMatcher>,
    fetcher: Arc<dyn Fetch>,
    report: Arc<dyn Report>,
}

impl std::fmt::Debug for PoolController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolController")
            .field("max_workers", &self.max_workers)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

impl PoolController {
    /// Validates `config` and builds a controller that fetches over HTTP and
    /// prints to the console
    pub fn new(config: &ScoutConfig) -> ScoutResult<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::new(config.fetch_timeout()?)?;
        Self::with_parts(config, fetcher, ConsoleReport)
    }

    /// Like [`new`](Self::new) with caller-provided fetching and output
    pub fn with_parts(
        config: &ScoutConfig,
        fetcher: impl Fetch + 'static,
        report: impl Report + 'static,
    ) -> ScoutResult<Self> {
        config.validate()?;
        let matcher = WordMatcher::new(&config.word)?.with_chunk_size(config.chunk_size);

        Ok(Self {
            max_workers: config.max_workers,
            matcher: Arc::new(matcher),
            fetcher: Arc::new(fetcher),
            report: Arc::new(report),
        })
    }

    /// Processes every task from `tasks` and returns once all workers, the
    /// hiring manager and the analyst have finished
    pub fn run(&self, tasks: Receiver<String>) -> ScoutResult<PoolSummary> {
        let started = Instant::now();
        info!(
            "Starting pool: up to {} workers counting '{}'",
            self.max_workers,
            self.matcher.word()
        );

        // max_workers is bounded by validation, so this cannot overflow
        let capacity = self.max_workers + 1;
        let (signal_tx, signal_rx) = bounded(capacity);
        let (result_tx, result_rx) = bounded(capacity);
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let roster = WorkerRoster::new();

        let kit = WorkerKit {
            tasks,
            signals: signal_tx,
            results: result_tx,
            fetcher: Arc::clone(&self.fetcher),
            matcher: Arc::clone(&self.matcher),
            report: Arc::clone(&self.report),
        };
        let first_kit = kit.clone();

        let analyst = Analyst::new(result_rx, Arc::clone(&self.report));
        let analyst = thread::Builder::new()
            .name("webscout-analyst".to_string())
            .spawn(move || analyst.run())?;

        let hiring = HiringManager::new(
            signal_rx,
            shutdown_rx,
            self.max_workers - 1,
            kit,
            Arc::clone(&roster),
            1,
        );
        let hiring = thread::Builder::new()
            .name("webscout-hiring".to_string())
            .spawn(move || hiring.run())?;

        let first = Worker::new(0, first_kit).spawn(roster.enlist()?)?;

        roster.wait_idle();
        debug!("All workers resigned, shutting down");
        drop(shutdown_tx);

        let hired = hiring
            .join()
            .map_err(|payload| ScoutError::thread_panicked("webscout-hiring", payload))??;
        let mut stats = first
            .join()
            .map_err(|payload| ScoutError::thread_panicked("webscout-worker-0", payload))?;
        stats.merge(hired.stats);
        let analysis = analyst
            .join()
            .map_err(|payload| ScoutError::thread_panicked("webscout-analyst", payload))?;

        let summary = PoolSummary {
            total: analysis.total,
            tasks_counted: stats.tasks_counted,
            tasks_failed: stats.tasks_failed,
            workers_spawned: hired.hired + 1,
            bytes_scanned: stats.bytes_scanned,
            elapsed: started.elapsed(),
        };

        info!(
            "Pool finished in {}: {} tasks counted, {} failed, {} workers, total {}",
            humantime::format_duration(summary.elapsed),
            summary.tasks_counted,
            summary.tasks_failed,
            summary.workers_spawned,
            summary.total
        );
        Ok(summary)
    }
}
