use crossbeam_channel::Receiver;
use std::sync::Arc;
use tracing::debug;

use crate::report::Report;
use crate::results::TaskCount;

/// Totals reported by the analyst at shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Analysis {
    pub(crate) total: u64,
    pub(crate) records: u64,
}

/// Sums per-task counts until the result channel closes
pub(crate) struct Analyst {
    results: Receiver<TaskCount>,
    report: Arc<dyn Report>,
}

impl Analyst {
    pub(crate) fn new(results: Receiver<TaskCount>, report: Arc<dyn Report>) -> Self {
        Self { results, report }
    }

    pub(crate) fn run(self) -> Analysis {
        let mut analysis = Analysis::default();
        for record in self.results.iter() {
            analysis.total += record.count;
            analysis.records += 1;
        }

        debug!(
            "Result channel closed after {} records",
            analysis.records
        );
        self.report.total(analysis.total);
        analysis
    }
}
