use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::errors::{ScoutError, ScoutResult};

#[derive(Debug, Default)]
struct RosterState {
    active: usize,
    closed: bool,
}

/// Tracks running workers so the controller can wait for all of them while
/// the hiring manager is still adding more.
///
/// A slot is taken with [`enlist`](Self::enlist) *before* the worker thread is
/// spawned and given back when the returned [`Shift`] drops at the end of the
/// worker. [`wait_idle`](Self::wait_idle) returns once the count reaches zero
/// and closes the roster in the same critical section, so a late `enlist`
/// either lands before the zero is observed (and is waited for) or is refused.
#[derive(Debug, Default)]
pub struct WorkerRoster {
    state: Mutex<RosterState>,
    idle: Condvar,
}

/// Proof of a registered worker; dropping it marks the worker finished
#[derive(Debug)]
pub struct Shift {
    roster: Arc<WorkerRoster>,
}

impl WorkerRoster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, RosterState> {
        // The counter stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers one more worker
    pub fn enlist(self: &Arc<Self>) -> ScoutResult<Shift> {
        let mut state = self.lock();
        if state.closed {
            return Err(ScoutError::RosterClosed);
        }
        state.active += 1;
        Ok(Shift {
            roster: Arc::clone(self),
        })
    }

    pub fn active(&self) -> usize {
        self.lock().active
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Blocks until no worker is registered, then refuses further enlistment
    pub fn wait_idle(&self) {
        let mut state = self.lock();
        while state.active > 0 {
            state = self
                .idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.closed = true;
    }

    fn release(&self) {
        let mut state = self.lock();
        state.active -= 1;
        if state.active == 0 {
            self.idle.notify_all();
        }
    }
}

impl Drop for Shift {
    fn drop(&mut self) {
        self.roster.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_wait_with_no_workers() {
        let roster = WorkerRoster::new();
        roster.wait_idle();
        assert!(roster.is_closed());
        assert!(matches!(roster.enlist(), Err(ScoutError::RosterClosed)));
    }

    #[test]
    fn test_shift_drop_releases() {
        let roster = WorkerRoster::new();
        let first = roster.enlist().unwrap();
        let second = roster.enlist().unwrap();
        assert_eq!(roster.active(), 2);
        drop(first);
        assert_eq!(roster.active(), 1);
        drop(second);
        assert_eq!(roster.active(), 0);
        assert!(!roster.is_closed());
    }

    #[test]
    fn test_enlist_while_waiting() {
        let roster = WorkerRoster::new();
        let first = roster.enlist().unwrap();

        let hirer = {
            let roster = Arc::clone(&roster);
            thread::spawn(move || {
                // A worker hires a colleague before finishing its own shift
                let second = roster.enlist().unwrap();
                drop(first);
                thread::sleep(Duration::from_millis(50));
                drop(second);
            })
        };

        roster.wait_idle();
        assert_eq!(roster.active(), 0);
        hirer.join().unwrap();
    }

    #[test]
    fn test_shift_released_on_panic() {
        let roster = WorkerRoster::new();
        let shift = roster.enlist().unwrap();
        let handle = thread::spawn(move || {
            let _shift = shift;
            panic!("worker blew up");
        });
        assert!(handle.join().is_err());
        roster.wait_idle();
        assert_eq!(roster.active(), 0);
    }
}
