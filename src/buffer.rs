//! Managed operand containers with implicit ordering
//!
//! A [`Buffer`] wraps operand data together with a record of the work
//! that last touched it. Submitting an operation against buffers orders
//! it automatically after the previous writer (and, for writes, after
//! outstanding readers), so callers using this memory model never handle
//! completion signals at all. The explicit-pointer model in [`crate::usm`]
//! is the parallel path for callers who do.

use crate::error::Result;
use crate::event::Event;
use bytemuck::Pod;
use std::cell::UnsafeCell;
use std::sync::{Arc, Mutex};

/// Ordering record for one managed container.
#[derive(Debug, Default)]
pub struct AccessState {
    /// Completion of the last submitted writer, if still relevant
    pub(crate) last_write: Option<Event>,
    /// Completions of readers submitted since the last writer
    pub(crate) readers: Vec<Event>,
}

struct BufferInner<T> {
    data: UnsafeCell<Box<[T]>>,
    state: Mutex<AccessState>,
}

// The ordering protocol serializes conflicting access: a task only
// touches `data` after every event recorded as a hazard for it has
// completed, so aliased mutation cannot race.
unsafe impl<T: Send> Send for BufferInner<T> {}
unsafe impl<T: Send + Sync> Sync for BufferInner<T> {}

/// Managed device-visible container of `T`.
///
/// Cloning is shallow; clones alias the same storage and ordering state.
#[derive(Clone)]
pub struct Buffer<T> {
    inner: Arc<BufferInner<T>>,
}

impl<T: Pod + Send + Sync> Buffer<T> {
    /// Create a zero-filled buffer of `len` elements.
    pub fn zeroed(len: usize) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                data: UnsafeCell::new(vec![T::zeroed(); len].into_boxed_slice()),
                state: Mutex::new(AccessState::default()),
            }),
        }
    }

    /// Create a buffer initialized from host data.
    pub fn from_slice(src: &[T]) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                data: UnsafeCell::new(src.to_vec().into_boxed_slice()),
                state: Mutex::new(AccessState::default()),
            }),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        unsafe { (&(*self.inner.data.get())).len() }
    }

    /// Whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the contents back to the host, after waiting for the last
    /// submitted writer. Surfaces any deferred execution failure.
    pub fn read(&self) -> Result<Vec<T>> {
        let last_write = {
            let state = self
                .inner
                .state
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            state.last_write.clone()
        };
        if let Some(ev) = last_write {
            ev.wait()?;
        }
        Ok(unsafe { (*self.inner.data.get()).to_vec() })
    }

    /// Device handle for the storage, in the crate's `u64` convention.
    pub(crate) fn device_ptr(&self) -> u64 {
        unsafe { (*self.inner.data.get()).as_ptr() as u64 }
    }

    /// Type-erased view used by function-table entries.
    pub(crate) fn raw(&self) -> RawBuf<'_> {
        RawBuf {
            ptr: self.device_ptr(),
            state: &self.inner.state,
        }
    }
}

/// Type-erased borrow of a managed container: the device handle plus the
/// ordering record. Function-table buffer entries receive these so one
/// erased signature serves every scalar type.
#[derive(Clone, Copy)]
pub struct RawBuf<'a> {
    pub(crate) ptr: u64,
    pub(crate) state: &'a Mutex<AccessState>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_roundtrip() {
        let buf = Buffer::from_slice(&[1.0f32, 2.0, 3.0]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.read().unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_clones_alias() {
        let a = Buffer::<f64>::zeroed(4);
        let b = a.clone();
        assert_eq!(a.device_ptr(), b.device_ptr());
    }
}
