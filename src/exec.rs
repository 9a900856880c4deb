//! Execution adapter
//!
//! Normalizes the two asynchronous execution conventions into one
//! submission primitive. Work runs on a detached host task (the same
//! envelope the vendor backends use for their native enqueues): the task
//! first waits for every predecessor, then runs the kernel, then signals
//! its own completion event with the kernel's outcome.
//!
//! A failed predecessor poisons the dependent event with the same error
//! and the dependent kernel never runs; partial-execution state is never
//! silently extended.

use crate::buffer::RawBuf;
use crate::error::Result;
use crate::event::Event;
use crate::queue::Queue;
use smallvec::SmallVec;
use std::thread;

type DepList = SmallVec<[Event; 4]>;

fn spawn_task<F>(queue: &Queue, deps: DepList, event: Event, task: F)
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    queue.record(&event);
    let completion = event;
    thread::spawn(move || {
        for dep in &deps {
            if let Err(e) = dep.wait() {
                completion.signal(Err(e));
                return;
            }
        }
        completion.signal(task());
    });
}

/// Submit work in the explicit-pointer model.
///
/// The returned event completes when `task` has finished (or is poisoned
/// by a failed predecessor) and is usable as a future predecessor.
pub(crate) fn enqueue<F>(queue: &Queue, deps: &[Event], task: F) -> Event
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let event = Event::pending();
    spawn_task(queue, deps.iter().cloned().collect(), event.clone(), task);
    event
}

/// Submit work in the managed-buffer model.
///
/// Dependencies are derived from the buffers' access records: the task is
/// ordered after the last writer of every operand, and writes are
/// additionally ordered after outstanding readers. Nothing observable is
/// returned; ordering is implicit.
pub(crate) fn enqueue_buffers<F>(queue: &Queue, reads: &[RawBuf<'_>], writes: &[RawBuf<'_>], task: F)
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let event = Event::pending();
    let mut deps = DepList::new();

    for rb in reads {
        let mut state = rb.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(w) = &state.last_write {
            deps.push(w.clone());
        }
        state.readers.push(event.clone());
    }

    for wb in writes {
        let mut state = wb.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(w) = state.last_write.take() {
            deps.push(w);
        }
        deps.extend(state.readers.drain(..));
        state.last_write = Some(event.clone());
    }

    spawn_task(queue, deps, event, task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use crate::queue::Device;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_dependency_ordering() {
        let device = Device::cpu();
        let queue = Queue::new(&device);
        let counter = Arc::new(AtomicUsize::new(0));

        let c1 = counter.clone();
        let first = enqueue(&queue, &[], move || {
            thread::sleep(Duration::from_millis(30));
            c1.store(1, Ordering::SeqCst);
            Ok(())
        });

        let c2 = counter.clone();
        let second = enqueue(&queue, &[first], move || {
            // must observe the predecessor's effect
            assert_eq!(c2.load(Ordering::SeqCst), 1);
            c2.store(2, Ordering::SeqCst);
            Ok(())
        });

        second.wait().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_predecessor_failure_poisons_dependent() {
        let device = Device::cpu();
        let queue = Queue::new(&device);

        let bad = enqueue(&queue, &[], || {
            Err(crate::error::Error::execution("native status -7"))
        });
        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        let dependent = enqueue(&queue, &[bad], move || {
            r.store(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(dependent.wait().is_err());
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_buffer_write_then_read_chains() {
        let device = Device::cpu();
        let queue = Queue::new(&device);
        let buf = Buffer::<f64>::zeroed(1);

        let ptr = buf.device_ptr();
        enqueue_buffers(&queue, &[], &[buf.raw()], move || {
            thread::sleep(Duration::from_millis(20));
            unsafe { *(ptr as *mut f64) = 42.0 };
            Ok(())
        });

        // read() waits the recorded writer
        assert_eq!(buf.read().unwrap(), vec![42.0]);
    }
}
