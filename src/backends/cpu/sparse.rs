//! CPU sparse kernels and table
//!
//! CSR matrix-vector multiply, gather form for the plain product and
//! scatter form for the transpose. Triangular solve entries stay `None`:
//! the ABI declares them, this provider has no kernel for them.

use super::CpuNative;
use crate::buffer::RawBuf;
use crate::dispatch::tables::{SparseTable, SpmvBufFn, SpmvUsmFn, ABI_VERSION};
use crate::error::Result;
use crate::event::Event;
use crate::exec::{enqueue, enqueue_buffers};
use crate::queue::Queue;
use crate::scalar::{RealScalar, Scalar};
use crate::select::CtSparse;
use crate::types::Transpose;

/// # Safety
/// CSR arrays consistent for an `nrows x ncols` matrix; `x`/`y` valid
/// for the operand lengths implied by `trans`.
#[allow(clippy::too_many_arguments)]
unsafe fn spmv_kernel<T: RealScalar>(
    trans: Transpose,
    nrows: usize,
    ncols: usize,
    alpha: T,
    row_ptr: u64,
    col_ind: u64,
    values: u64,
    x: u64,
    beta: T,
    y: u64,
) {
    let rp = row_ptr as *const i64;
    let ci = col_ind as *const i64;
    let vp = values as *const T;
    let xp = x as *const T;
    let yp = y as *mut T;
    let zero = <T as Scalar>::zero();

    match trans {
        Transpose::NoTrans => {
            for i in 0..nrows {
                let start = *rp.add(i) as usize;
                let end = *rp.add(i + 1) as usize;
                let mut acc = zero;
                for idx in start..end {
                    let j = *ci.add(idx) as usize;
                    acc = acc + *vp.add(idx) * *xp.add(j);
                }
                let out = yp.add(i);
                *out = if beta == zero {
                    alpha * acc
                } else {
                    alpha * acc + beta * *out
                };
            }
        }
        // transpose runs in scatter form over the same arrays
        _ => {
            for j in 0..ncols {
                let out = yp.add(j);
                *out = if beta == zero { zero } else { beta * *out };
            }
            for i in 0..nrows {
                let start = *rp.add(i) as usize;
                let end = *rp.add(i + 1) as usize;
                let xi = *xp.add(i);
                for idx in start..end {
                    let j = *ci.add(idx) as usize;
                    *yp.add(j) = *yp.add(j) + alpha * *vp.add(idx) * xi;
                }
            }
        }
    }
}

// ============================================================================
// Typed entry points
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub(crate) fn spmv<T: RealScalar>(
    queue: &Queue,
    trans: Transpose,
    nrows: usize,
    ncols: usize,
    alpha: T,
    row_ptr: u64,
    col_ind: u64,
    values: u64,
    x: u64,
    beta: T,
    y: u64,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe {
            spmv_kernel::<T>(trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta, y)
        };
        Ok(())
    }))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn spmv_buf<T: RealScalar>(
    queue: &Queue,
    trans: Transpose,
    nrows: usize,
    ncols: usize,
    alpha: T,
    row_ptr: RawBuf<'_>,
    col_ind: RawBuf<'_>,
    values: RawBuf<'_>,
    x: RawBuf<'_>,
    beta: T,
    y: RawBuf<'_>,
) -> Result<()> {
    let (prp, pci, pv, px, py) = (row_ptr.ptr, col_ind.ptr, values.ptr, x.ptr, y.ptr);
    enqueue_buffers(queue, &[row_ptr, col_ind, values, x], &[y], move || {
        unsafe { spmv_kernel::<T>(trans, nrows, ncols, alpha, prp, pci, pv, px, beta, py) };
        Ok(())
    });
    Ok(())
}

// ============================================================================
// Erased table entries
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn spmv_usm_erased<T: RealScalar>(
    queue: &Queue,
    trans: Transpose,
    nrows: usize,
    ncols: usize,
    alpha: *const u8,
    row_ptr: u64,
    col_ind: u64,
    values: u64,
    x: u64,
    beta: *const u8,
    y: u64,
    deps: &[Event],
) -> Result<Event> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    spmv::<T>(
        queue, trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta, y, deps,
    )
}

#[allow(clippy::too_many_arguments)]
fn spmv_buf_erased<T: RealScalar>(
    queue: &Queue,
    trans: Transpose,
    nrows: usize,
    ncols: usize,
    alpha: *const u8,
    row_ptr: RawBuf<'_>,
    col_ind: RawBuf<'_>,
    values: RawBuf<'_>,
    x: RawBuf<'_>,
    beta: *const u8,
    y: RawBuf<'_>,
) -> Result<()> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    spmv_buf::<T>(
        queue, trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta, y,
    )
}

use super::real_types;

pub(crate) static TABLE: SparseTable = SparseTable {
    abi: ABI_VERSION,
    spmv: real_types!(spmv_usm_erased, SpmvUsmFn),
    spmv_buf: real_types!(spmv_buf_erased, SpmvBufFn),
    trsv: [None, None, None, None],
    trsv_buf: [None, None, None, None],
};

// ============================================================================
// Compile-time entry points
// ============================================================================

impl CtSparse for CpuNative {
    fn spmv<T: RealScalar>(
        queue: &Queue,
        trans: Transpose,
        nrows: usize,
        ncols: usize,
        alpha: T,
        row_ptr: u64,
        col_ind: u64,
        values: u64,
        x: u64,
        beta: T,
        y: u64,
        deps: &[Event],
    ) -> Result<Event> {
        spmv::<T>(
            queue, trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta, y, deps,
        )
    }

    fn spmv_buf<T: RealScalar>(
        queue: &Queue,
        trans: Transpose,
        nrows: usize,
        ncols: usize,
        alpha: T,
        row_ptr: &crate::buffer::Buffer<i64>,
        col_ind: &crate::buffer::Buffer<i64>,
        values: &crate::buffer::Buffer<T>,
        x: &crate::buffer::Buffer<T>,
        beta: T,
        y: &crate::buffer::Buffer<T>,
    ) -> Result<()> {
        spmv_buf::<T>(
            queue,
            trans,
            nrows,
            ncols,
            alpha,
            row_ptr.raw(),
            col_ind.raw(),
            values.raw(),
            x.raw(),
            beta,
            y.raw(),
        )
    }
}
