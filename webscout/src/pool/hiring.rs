use crossbeam_channel::{select, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::roster::WorkerRoster;
use super::worker::{Worker, WorkerKit};
use super::WorkSignal;
use crate::errors::{ScoutError, ScoutResult};
use crate::results::WorkerStats;

/// What the hiring manager did over the run
#[derive(Debug, Default)]
pub(crate) struct HiringOutcome {
    pub(crate) hired: usize,
    pub(crate) stats: WorkerStats,
}

/// Grows the pool by one worker per claimed task until the cap is reached.
///
/// `open_positions` is only touched on this thread. Signals that arrive with
/// no open positions are drained so workers never block on a full channel.
pub(crate) struct HiringManager {
    signals: Receiver<WorkSignal>,
    shutdown: Receiver<()>,
    open_positions: usize,
    kit: WorkerKit,
    roster: Arc<WorkerRoster>,
    next_id: usize,
    staff: Vec<JoinHandle<WorkerStats>>,
}

impl HiringManager {
    pub(crate) fn new(
        signals: Receiver<WorkSignal>,
        shutdown: Receiver<()>,
        open_positions: usize,
        kit: WorkerKit,
        roster: Arc<WorkerRoster>,
        first_id: usize,
    ) -> Self {
        Self {
            signals,
            shutdown,
            open_positions,
            kit,
            roster,
            next_id: first_id,
            staff: Vec::new(),
        }
    }

    /// Listens until the controller closes `shutdown`, then collects the
    /// statistics of every worker it hired
    pub(crate) fn run(mut self) -> ScoutResult<HiringOutcome> {
        // select! keeps its receivers borrowed while an arm runs
        let signals = self.signals.clone();
        let shutdown = self.shutdown.clone();

        loop {
            select! {
                recv(signals) -> signal => match signal {
                    Ok(WorkSignal) => self.on_signal(),
                    Err(_) => break,
                },
                recv(shutdown) -> _ => break,
            }
        }

        let mut outcome = HiringOutcome {
            hired: self.staff.len(),
            ..HiringOutcome::default()
        };
        for handle in self.staff {
            let stats = handle
                .join()
                .map_err(|payload| ScoutError::thread_panicked("webscout-worker", payload))?;
            outcome.stats.merge(stats);
        }

        debug!("Hiring manager done, {} workers hired", outcome.hired);
        Ok(outcome)
    }

    fn on_signal(&mut self) {
        if self.open_positions == 0 {
            trace!("Pool at capacity, signal drained");
            return;
        }

        let shift = match self.roster.enlist() {
            Ok(shift) => shift,
            Err(_) => {
                debug!("All workers finished, not hiring");
                return;
            }
        };

        let id = self.next_id;
        match Worker::new(id, self.kit.clone()).spawn(shift) {
            Ok(handle) => {
                self.open_positions -= 1;
                self.next_id += 1;
                self.staff.push(handle);
                info!(
                    "Hired worker {} ({} positions left)",
                    id, self.open_positions
                );
            }
            // The shift went down with the failed spawn closure
            Err(e) => warn!("Could not start worker {}: {}", id, e),
        }
    }
}
