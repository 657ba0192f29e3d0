use crossbeam_channel::{bounded, Receiver};
use std::io::BufRead;
use std::thread;
use tracing::{debug, error};

use crate::errors::ScoutResult;

/// Buffered URLs between the reader thread and the pool
pub const SOURCE_CAPACITY: usize = 100;

/// Streams the lines of `reader` into a channel from a background thread.
///
/// Lines are trimmed and blank lines skipped. The channel closes when the
/// reader is exhausted, when a read fails (the error is logged) or when every
/// receiver is gone.
pub fn spawn_line_source<R>(reader: R) -> ScoutResult<Receiver<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = bounded(SOURCE_CAPACITY);

    thread::Builder::new()
        .name("webscout-source".to_string())
        .spawn(move || {
            let mut sent = 0usize;
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        error!("Failed to read task list: {}", e);
                        break;
                    }
                };

                let url = line.trim();
                if url.is_empty() {
                    continue;
                }
                if tx.send(url.to_string()).is_err() {
                    debug!("Task channel dropped, stopping source");
                    break;
                }
                sent += 1;
            }
            debug!("Task source finished after {} URLs", sent);
        })?;

    Ok(rx)
}
