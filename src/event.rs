//! Abstract completion signals
//!
//! An [`Event`] represents "this submitted work has finished" and is
//! usable as another call's predecessor regardless of which backend
//! executed the work. Backends whose native runtime has its own
//! completion primitive wrap it into an `Event` exactly once at
//! submission, so the outward contract never changes shape.
//!
//! An event also carries the deferred outcome of the work: a kernel that
//! fails after submission records its error here, and `wait` surfaces it.

use crate::error::Result;
use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug)]
struct EventState {
    // None while pending; Some(outcome) once signaled
    outcome: Mutex<Option<Result<()>>>,
    cond: Condvar,
}

/// Completion signal for one submitted piece of work.
///
/// Cloning is cheap and clones observe the same completion.
#[derive(Debug, Clone)]
pub struct Event {
    inner: Arc<EventState>,
}

impl Event {
    /// Create a pending event. Signaled later by the execution adapter.
    pub(crate) fn pending() -> Self {
        Self {
            inner: Arc::new(EventState {
                outcome: Mutex::new(None),
                cond: Condvar::new(),
            }),
        }
    }

    /// An already-complete successful event.
    ///
    /// Useful as a neutral predecessor when a caller has no prior work.
    pub fn completed() -> Self {
        Self {
            inner: Arc::new(EventState {
                outcome: Mutex::new(Some(Ok(()))),
                cond: Condvar::new(),
            }),
        }
    }

    /// Record the outcome of the work and wake all waiters.
    ///
    /// Signaling twice is a logic error in the adapter; the first outcome
    /// wins and the second is dropped.
    pub(crate) fn signal(&self, outcome: Result<()>) {
        let mut slot = self
            .inner
            .outcome
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(outcome);
            self.inner.cond.notify_all();
        }
    }

    /// Block until the work completes, surfacing any execution failure
    /// the backend reported after submission.
    pub fn wait(&self) -> Result<()> {
        let mut slot = self
            .inner
            .outcome
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        while slot.is_none() {
            slot = self
                .inner
                .cond
                .wait(slot)
                .unwrap_or_else(|e| e.into_inner());
        }
        slot.as_ref().expect("signaled").clone()
    }

    /// Non-blocking completion check.
    pub fn is_complete(&self) -> bool {
        self.inner
            .outcome
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

/// Wait on a slice of events, returning the first failure encountered.
pub fn wait_all(events: &[Event]) -> Result<()> {
    for ev in events {
        ev.wait()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_completed_event_is_done() {
        let ev = Event::completed();
        assert!(ev.is_complete());
        assert!(ev.wait().is_ok());
    }

    #[test]
    fn test_wait_blocks_until_signal() {
        let ev = Event::pending();
        let waiter = ev.clone();
        let handle = thread::spawn(move || waiter.wait());
        thread::sleep(Duration::from_millis(20));
        assert!(!ev.is_complete());
        ev.signal(Ok(()));
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn test_failure_surfaces_on_wait() {
        let ev = Event::pending();
        ev.signal(Err(Error::execution("kernel reported status 3")));
        match ev.wait() {
            Err(Error::ExecutionFailure { detail }) => {
                assert!(detail.contains("status 3"));
            }
            other => panic!("expected ExecutionFailure, got {:?}", other),
        }
    }
}
