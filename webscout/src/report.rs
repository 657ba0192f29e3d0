use std::io::{self, Write};
use tracing::debug;

use crate::errors::ScoutError;

/// Operator-visible output of a run.
///
/// Workers call `task_counted`/`task_failed` as tasks finish, possibly from
/// several threads at once; the analyst calls `total` exactly once.
pub trait Report: Send + Sync {
    fn task_counted(&self, url: &str, count: u64);
    fn task_failed(&self, url: &str, error: &ScoutError);
    fn total(&self, total: u64);
}

/// Counts and the total on stdout, failures on stderr.
///
/// A closed pipe (`webscout | head -1`) does not stop the run; lines that
/// cannot be written are dropped and logged at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReport;

impl Report for ConsoleReport {
    fn task_counted(&self, url: &str, count: u64) {
        emit(io::stdout().lock(), &count_line(url, count));
    }

    fn task_failed(&self, url: &str, error: &ScoutError) {
        emit(io::stderr().lock(), &format!("Count for {}: {}", url, error));
    }

    fn total(&self, total: u64) {
        emit(io::stdout().lock(), &total_line(total));
    }
}

/// Writes one line, swallowing write errors
fn emit(mut out: impl Write, line: &str) -> bool {
    match writeln!(out, "{}", line).and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            debug!("Dropped output line '{}': {}", line, e);
            false
        }
    }
}

pub fn count_line(url: &str, count: u64) -> String {
    format!("Count for {}: {}", url, count)
}

pub fn total_line(total: u64) -> String {
    format!("Total: {}", total)
}
