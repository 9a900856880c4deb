//! CPU transform kernels and table
//!
//! Stockham autosort radix-2 FFT: no bit-reversal pass, sequential
//! access, double-buffered between a working copy and the in-place
//! output. Lengths are powers of two; the descriptor enforces that
//! before anything is submitted. Backward transforms scale by `1/n`, so
//! forward-then-backward is the identity.

use super::CpuNative;
use crate::buffer::RawBuf;
use crate::dispatch::tables::{DftBufFn, DftTable, DftUsmFn, ABI_VERSION};
use crate::error::Result;
use crate::event::Event;
use crate::exec::{enqueue, enqueue_buffers};
use crate::queue::Queue;
use crate::scalar::ComplexScalar;
use crate::select::CtDft;
use std::f64::consts::PI;

/// # Safety
/// `data` valid for `n` complex elements; `n` is a power of two.
unsafe fn fft_kernel<T: ComplexScalar>(n: usize, data: u64, inverse: bool) {
    // length-1 transform is the identity in both directions
    if n <= 1 {
        return;
    }

    let p = data as *mut T;
    let mut src: Vec<T> = std::slice::from_raw_parts(p as *const T, n).to_vec();
    let mut dst: Vec<T> = vec![T::zero(); n];

    let sign = if inverse { 1.0 } else { -1.0 };
    let stages = n.trailing_zeros();
    let mut half = 1usize;
    let mut span = 2usize;

    for _ in 0..stages {
        let groups = n / span;
        for g in 0..groups {
            for b in 0..half {
                let tw = T::unit_at(sign * 2.0 * PI * (b as f64) / (span as f64));
                let even = src[g * half + b];
                let odd = src[n / 2 + g * half + b] * tw;
                dst[g * span + b] = even + odd;
                dst[g * span + b + half] = even - odd;
            }
        }
        std::mem::swap(&mut src, &mut dst);
        half *= 2;
        span *= 2;
    }

    if inverse {
        let scale = 1.0 / n as f64;
        for v in src.iter_mut() {
            *v = v.scale_by(scale);
        }
    }
    std::ptr::copy_nonoverlapping(src.as_ptr(), p, n);
}

// ============================================================================
// Typed entry points
// ============================================================================

pub(crate) fn forward<T: ComplexScalar>(
    queue: &Queue,
    n: usize,
    inout: u64,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe { fft_kernel::<T>(n, inout, false) };
        Ok(())
    }))
}

pub(crate) fn forward_buf<T: ComplexScalar>(queue: &Queue, n: usize, inout: RawBuf<'_>) -> Result<()> {
    let p = inout.ptr;
    enqueue_buffers(queue, &[], &[inout], move || {
        unsafe { fft_kernel::<T>(n, p, false) };
        Ok(())
    });
    Ok(())
}

pub(crate) fn backward<T: ComplexScalar>(
    queue: &Queue,
    n: usize,
    inout: u64,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe { fft_kernel::<T>(n, inout, true) };
        Ok(())
    }))
}

pub(crate) fn backward_buf<T: ComplexScalar>(
    queue: &Queue,
    n: usize,
    inout: RawBuf<'_>,
) -> Result<()> {
    let p = inout.ptr;
    enqueue_buffers(queue, &[], &[inout], move || {
        unsafe { fft_kernel::<T>(n, p, true) };
        Ok(())
    });
    Ok(())
}

// ============================================================================
// Erased table entries
// ============================================================================

fn forward_usm_erased<T: ComplexScalar>(
    queue: &Queue,
    n: usize,
    inout: u64,
    deps: &[Event],
) -> Result<Event> {
    forward::<T>(queue, n, inout, deps)
}

fn forward_buf_erased<T: ComplexScalar>(queue: &Queue, n: usize, inout: RawBuf<'_>) -> Result<()> {
    forward_buf::<T>(queue, n, inout)
}

fn backward_usm_erased<T: ComplexScalar>(
    queue: &Queue,
    n: usize,
    inout: u64,
    deps: &[Event],
) -> Result<Event> {
    backward::<T>(queue, n, inout, deps)
}

fn backward_buf_erased<T: ComplexScalar>(queue: &Queue, n: usize, inout: RawBuf<'_>) -> Result<()> {
    backward_buf::<T>(queue, n, inout)
}

use super::complex_types;

pub(crate) static TABLE: DftTable = DftTable {
    abi: ABI_VERSION,
    forward: complex_types!(forward_usm_erased, DftUsmFn),
    forward_buf: complex_types!(forward_buf_erased, DftBufFn),
    backward: complex_types!(backward_usm_erased, DftUsmFn),
    backward_buf: complex_types!(backward_buf_erased, DftBufFn),
};

// ============================================================================
// Compile-time entry points
// ============================================================================

impl CtDft for CpuNative {
    fn forward<T: ComplexScalar>(
        queue: &Queue,
        n: usize,
        inout: u64,
        deps: &[Event],
    ) -> Result<Event> {
        forward::<T>(queue, n, inout, deps)
    }

    fn forward_buf<T: ComplexScalar>(
        queue: &Queue,
        n: usize,
        inout: &crate::buffer::Buffer<T>,
    ) -> Result<()> {
        forward_buf::<T>(queue, n, inout.raw())
    }

    fn backward<T: ComplexScalar>(
        queue: &Queue,
        n: usize,
        inout: u64,
        deps: &[Event],
    ) -> Result<Event> {
        backward::<T>(queue, n, inout, deps)
    }

    fn backward_buf<T: ComplexScalar>(
        queue: &Queue,
        n: usize,
        inout: &crate::buffer::Buffer<T>,
    ) -> Result<()> {
        backward_buf::<T>(queue, n, inout.raw())
    }
}
