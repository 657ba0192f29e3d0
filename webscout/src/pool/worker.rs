use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

use super::roster::Shift;
use super::WorkSignal;
use crate::errors::ScoutResult;
use crate::fetch::Fetch;
use crate::report::Report;
use crate::results::{TaskCount, WorkerStats};
use crate::search::matcher::{MatchTally, WordMatcher};

/// Everything a worker needs; cloned once per hire
#[derive(Clone)]
pub(crate) struct WorkerKit {
    pub(crate) tasks: Receiver<String>,
    pub(crate) signals: Sender<WorkSignal>,
    pub(crate) results: Sender<TaskCount>,
    pub(crate) fetcher: Arc<dyn Fetch>,
    pub(crate) matcher: Arc<WordMatcher>,
    pub(crate) report: Arc<dyn Report>,
}

/// Pulls tasks one at a time until the task channel is closed and drained
pub(crate) struct Worker {
    id: usize,
    kit: WorkerKit,
    stats: WorkerStats,
}

impl Worker {
    pub(crate) fn new(id: usize, kit: WorkerKit) -> Self {
        Self {
            id,
            kit,
            stats: WorkerStats::default(),
        }
    }

    /// Starts the worker on its own thread; `shift` is released when it resigns
    pub(crate) fn spawn(self, shift: Shift) -> ScoutResult<JoinHandle<WorkerStats>> {
        let handle = thread::Builder::new()
            .name(format!("webscout-worker-{}", self.id))
            .spawn(move || {
                let _shift = shift;
                self.run()
            })?;
        Ok(handle)
    }

    pub(crate) fn run(mut self) -> WorkerStats {
        debug!("Worker {} started", self.id);

        while let Ok(url) = self.kit.tasks.recv() {
            self.stats.tasks_claimed += 1;
            // Capacity is max_workers + 1, so this only waits momentarily
            if self.kit.signals.send(WorkSignal).is_err() {
                trace!("Worker {}: hiring manager already gone", self.id);
            }
            self.process(&url);
        }

        debug!(
            "Worker {} resigning after {} tasks",
            self.id, self.stats.tasks_claimed
        );
        self.stats
    }

    fn process(&mut self, url: &str) {
        match self.count(url) {
            Ok(tally) => {
                self.stats.tasks_counted += 1;
                self.stats.bytes_scanned += tally.bytes_scanned;
                if self
                    .kit
                    .results
                    .send(TaskCount {
                        count: tally.occurrences,
                    })
                    .is_err()
                {
                    warn!("Analyst gone, count for {} not aggregated", url);
                }
                self.kit.report.task_counted(url, tally.occurrences);
            }
            Err(e) => {
                self.stats.tasks_failed += 1;
                debug!("Worker {} failed on {}: {}", self.id, url, e);
                self.kit.report.task_failed(url, &e);
            }
        }
    }

    fn count(&self, url: &str) -> ScoutResult<MatchTally> {
        let body = self.kit.fetcher.fetch(url)?;
        // `body` is dropped on return, whichever way the scan ends
        self.kit.matcher.scan(body)
    }
}
