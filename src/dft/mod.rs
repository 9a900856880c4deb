//! Discrete Fourier transform facade
//!
//! Transforms are driven by a descriptor: configure the length, commit
//! it against a selector (resolving the backend once and failing there
//! on deployment gaps), then compute. Forward transforms are unscaled;
//! backward transforms scale by `1/n`, so forward-then-backward is the
//! identity.

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::scalar::ComplexScalar;
use crate::select::DftDispatch;
use std::marker::PhantomData;

/// In-place 1-D complex-to-complex transform descriptor.
#[derive(Debug)]
pub struct DftDescriptor<T: ComplexScalar> {
    n: usize,
    committed: bool,
    _scalar: PhantomData<T>,
}

impl<T: ComplexScalar> DftDescriptor<T> {
    /// Create a descriptor for transforms of length `n`.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            committed: false,
            _scalar: PhantomData,
        }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the descriptor has zero length.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Validate the configuration and resolve the backend.
    ///
    /// The built transforms are radix-2; a non-power-of-two length is a
    /// configuration error, reported here and never submitted.
    pub fn commit<S: DftDispatch>(&mut self, sel: &S) -> Result<()> {
        if self.n == 0 || !self.n.is_power_of_two() {
            return Err(Error::invalid_arg(
                "n",
                format!("transform length {} is not a power of two", self.n),
            ));
        }
        sel.probe()?;
        self.committed = true;
        Ok(())
    }

    fn require_committed(&self) -> Result<()> {
        if !self.committed {
            return Err(Error::invalid_arg("descriptor", "not committed"));
        }
        Ok(())
    }
}

/// Forward transform in place over `inout`, explicit-pointer model.
pub fn compute_forward<S: DftDispatch, T: ComplexScalar>(
    desc: &DftDescriptor<T>,
    sel: &S,
    inout: u64,
    deps: &[Event],
) -> Result<Event> {
    desc.require_committed()?;
    sel.forward::<T>(desc.n, inout, deps)
}

/// Forward transform, managed-buffer model.
pub fn compute_forward_buf<S: DftDispatch, T: ComplexScalar>(
    desc: &DftDescriptor<T>,
    sel: &S,
    inout: &Buffer<T>,
) -> Result<()> {
    desc.require_committed()?;
    if inout.len() < desc.n {
        return Err(Error::invalid_arg("inout", "buffer shorter than n"));
    }
    sel.forward_buf::<T>(desc.n, inout)
}

/// Backward transform (scaled by `1/n`) in place, explicit-pointer model.
pub fn compute_backward<S: DftDispatch, T: ComplexScalar>(
    desc: &DftDescriptor<T>,
    sel: &S,
    inout: u64,
    deps: &[Event],
) -> Result<Event> {
    desc.require_committed()?;
    sel.backward::<T>(desc.n, inout, deps)
}

/// Backward transform, managed-buffer model.
pub fn compute_backward_buf<S: DftDispatch, T: ComplexScalar>(
    desc: &DftDescriptor<T>,
    sel: &S,
    inout: &Buffer<T>,
) -> Result<()> {
    desc.require_committed()?;
    if inout.len() < desc.n {
        return Err(Error::invalid_arg("inout", "buffer shorter than n"));
    }
    sel.backward_buf::<T>(desc.n, inout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Complex64;

    #[test]
    fn test_uncommitted_descriptor_refuses_compute() {
        let desc = DftDescriptor::<Complex64>::new(8);
        let err = desc.require_committed().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
