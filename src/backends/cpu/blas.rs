//! CPU reference BLAS kernels and table
//!
//! Kernels take column-major arguments and `u64` device handles; they run
//! inside the host-task envelope, so every entry point here only builds
//! the closure and submits. Matrix kernels parallelize over output
//! columns when the `rayon` feature is on.

use super::CpuNative;
use crate::buffer::RawBuf;
use crate::dispatch::tables::{
    AxpyBufFn, AxpyUsmFn, BlasTable, DotBufFn, DotUsmFn, GemmBufFn, GemmUsmFn, GemvBufFn,
    GemvUsmFn, SyrkBufFn, SyrkUsmFn, ABI_VERSION,
};
use crate::error::Result;
use crate::event::Event;
use crate::exec::{enqueue, enqueue_buffers};
use crate::queue::Queue;
use crate::scalar::Scalar;
use crate::select::CtBlas;
use crate::types::{Transpose, UpLo};

// ============================================================================
// Kernels
// ============================================================================

#[inline]
unsafe fn mat_at<T: Scalar>(base: u64, trans: Transpose, i: usize, j: usize, ld: usize) -> T {
    let p = base as *const T;
    match trans {
        Transpose::NoTrans => *p.add(i + j * ld),
        Transpose::Trans => *p.add(j + i * ld),
        Transpose::ConjTrans => (*p.add(j + i * ld)).conj(),
    }
}

/// One output column of gemm.
///
/// # Safety
/// Pointers valid for the stated dimensions; `c` does not alias `a`/`b`.
#[allow(clippy::too_many_arguments)]
unsafe fn gemm_col<T: Scalar>(
    ta: Transpose,
    tb: Transpose,
    m: usize,
    k: usize,
    alpha: T,
    a: u64,
    lda: usize,
    b: u64,
    ldb: usize,
    beta: T,
    c: u64,
    ldc: usize,
    j: usize,
) {
    let c_col = (c as *mut T).add(j * ldc);
    for i in 0..m {
        let mut acc = T::zero();
        for l in 0..k {
            acc = acc + mat_at::<T>(a, ta, i, l, lda) * mat_at::<T>(b, tb, l, j, ldb);
        }
        let out = c_col.add(i);
        // beta == 0 means C is not read (it may hold garbage)
        *out = if beta == T::zero() {
            alpha * acc
        } else {
            alpha * acc + beta * *out
        };
    }
}

/// # Safety
/// Pointers valid for the stated dimensions; `c` does not alias `a`/`b`.
#[allow(clippy::too_many_arguments)]
unsafe fn gemm_kernel<T: Scalar>(
    ta: Transpose,
    tb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: u64,
    lda: usize,
    b: u64,
    ldb: usize,
    beta: T,
    c: u64,
    ldc: usize,
) {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().for_each(|j| unsafe {
            gemm_col::<T>(ta, tb, m, k, alpha, a, lda, b, ldb, beta, c, ldc, j);
        });
    }
    #[cfg(not(feature = "rayon"))]
    for j in 0..n {
        gemm_col::<T>(ta, tb, m, k, alpha, a, lda, b, ldb, beta, c, ldc, j);
    }
}

/// # Safety
/// Pointers valid for the stated dimensions; `y` does not alias `a`/`x`.
#[allow(clippy::too_many_arguments)]
unsafe fn gemv_kernel<T: Scalar>(
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: u64,
    lda: usize,
    x: u64,
    incx: usize,
    beta: T,
    y: u64,
    incy: usize,
) {
    let xp = x as *const T;
    let yp = y as *mut T;
    let (rows, cols) = match trans {
        Transpose::NoTrans => (m, n),
        _ => (n, m),
    };
    for i in 0..rows {
        let mut acc = T::zero();
        for j in 0..cols {
            acc = acc + mat_at::<T>(a, trans, i, j, lda) * *xp.add(j * incx);
        }
        let out = yp.add(i * incy);
        *out = if beta == T::zero() {
            alpha * acc
        } else {
            alpha * acc + beta * *out
        };
    }
}

/// # Safety
/// Pointers valid for the stated dimensions; only the `uplo` triangle of
/// `c` is touched.
#[allow(clippy::too_many_arguments)]
unsafe fn syrk_kernel<T: Scalar>(
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: u64,
    lda: usize,
    beta: T,
    c: u64,
    ldc: usize,
) {
    let cp = c as *mut T;
    // op(A) row i, column l
    let op_at = |i: usize, l: usize| -> T {
        unsafe {
            match trans {
                Transpose::NoTrans => mat_at::<T>(a, Transpose::NoTrans, i, l, lda),
                _ => mat_at::<T>(a, Transpose::Trans, i, l, lda),
            }
        }
    };
    for j in 0..n {
        let (lo, hi) = match uplo {
            UpLo::Upper => (0, j + 1),
            UpLo::Lower => (j, n),
        };
        for i in lo..hi {
            let mut acc = T::zero();
            for l in 0..k {
                acc = acc + op_at(i, l) * op_at(j, l);
            }
            let out = cp.add(i + j * ldc);
            *out = if beta == T::zero() {
                alpha * acc
            } else {
                alpha * acc + beta * *out
            };
        }
    }
}

/// # Safety
/// Pointers valid for `n` strided elements each.
unsafe fn axpy_kernel<T: Scalar>(n: usize, alpha: T, x: u64, incx: usize, y: u64, incy: usize) {
    let xp = x as *const T;
    let yp = y as *mut T;
    for i in 0..n {
        let out = yp.add(i * incy);
        *out = *out + alpha * *xp.add(i * incx);
    }
}

/// # Safety
/// Pointers valid for `n` strided elements; `result` valid for one write.
unsafe fn dot_kernel<T: Scalar>(
    n: usize,
    x: u64,
    incx: usize,
    y: u64,
    incy: usize,
    result: u64,
) {
    let xp = x as *const T;
    let yp = y as *const T;
    let mut acc = T::zero();
    for i in 0..n {
        acc = acc + *xp.add(i * incx) * *yp.add(i * incy);
    }
    *(result as *mut T) = acc;
}

// ============================================================================
// Typed entry points (compile-time path and shim targets)
// ============================================================================

#[allow(clippy::too_many_arguments)]
pub(crate) fn gemm<T: Scalar>(
    queue: &Queue,
    ta: Transpose,
    tb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: u64,
    lda: usize,
    b: u64,
    ldb: usize,
    beta: T,
    c: u64,
    ldc: usize,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe { gemm_kernel::<T>(ta, tb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc) };
        Ok(())
    }))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn gemm_buf<T: Scalar>(
    queue: &Queue,
    ta: Transpose,
    tb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: RawBuf<'_>,
    lda: usize,
    b: RawBuf<'_>,
    ldb: usize,
    beta: T,
    c: RawBuf<'_>,
    ldc: usize,
) -> Result<()> {
    let (pa, pb, pc) = (a.ptr, b.ptr, c.ptr);
    enqueue_buffers(queue, &[a, b], &[c], move || {
        unsafe { gemm_kernel::<T>(ta, tb, m, n, k, alpha, pa, lda, pb, ldb, beta, pc, ldc) };
        Ok(())
    });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn gemv<T: Scalar>(
    queue: &Queue,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: u64,
    lda: usize,
    x: u64,
    incx: usize,
    beta: T,
    y: u64,
    incy: usize,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe { gemv_kernel::<T>(trans, m, n, alpha, a, lda, x, incx, beta, y, incy) };
        Ok(())
    }))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn gemv_buf<T: Scalar>(
    queue: &Queue,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: T,
    a: RawBuf<'_>,
    lda: usize,
    x: RawBuf<'_>,
    incx: usize,
    beta: T,
    y: RawBuf<'_>,
    incy: usize,
) -> Result<()> {
    let (pa, px, py) = (a.ptr, x.ptr, y.ptr);
    enqueue_buffers(queue, &[a, x], &[y], move || {
        unsafe { gemv_kernel::<T>(trans, m, n, alpha, pa, lda, px, incx, beta, py, incy) };
        Ok(())
    });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn syrk<T: Scalar>(
    queue: &Queue,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: u64,
    lda: usize,
    beta: T,
    c: u64,
    ldc: usize,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe { syrk_kernel::<T>(uplo, trans, n, k, alpha, a, lda, beta, c, ldc) };
        Ok(())
    }))
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn syrk_buf<T: Scalar>(
    queue: &Queue,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: T,
    a: RawBuf<'_>,
    lda: usize,
    beta: T,
    c: RawBuf<'_>,
    ldc: usize,
) -> Result<()> {
    let (pa, pc) = (a.ptr, c.ptr);
    enqueue_buffers(queue, &[a], &[c], move || {
        unsafe { syrk_kernel::<T>(uplo, trans, n, k, alpha, pa, lda, beta, pc, ldc) };
        Ok(())
    });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn axpy<T: Scalar>(
    queue: &Queue,
    n: usize,
    alpha: T,
    x: u64,
    incx: usize,
    y: u64,
    incy: usize,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe { axpy_kernel::<T>(n, alpha, x, incx, y, incy) };
        Ok(())
    }))
}

pub(crate) fn axpy_buf<T: Scalar>(
    queue: &Queue,
    n: usize,
    alpha: T,
    x: RawBuf<'_>,
    incx: usize,
    y: RawBuf<'_>,
    incy: usize,
) -> Result<()> {
    let (px, py) = (x.ptr, y.ptr);
    enqueue_buffers(queue, &[x], &[y], move || {
        unsafe { axpy_kernel::<T>(n, alpha, px, incx, py, incy) };
        Ok(())
    });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn dot<T: Scalar>(
    queue: &Queue,
    n: usize,
    x: u64,
    incx: usize,
    y: u64,
    incy: usize,
    result: u64,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || {
        unsafe { dot_kernel::<T>(n, x, incx, y, incy, result) };
        Ok(())
    }))
}

pub(crate) fn dot_buf<T: Scalar>(
    queue: &Queue,
    n: usize,
    x: RawBuf<'_>,
    incx: usize,
    y: RawBuf<'_>,
    incy: usize,
    result: RawBuf<'_>,
) -> Result<()> {
    let (px, py, pr) = (x.ptr, y.ptr, result.ptr);
    enqueue_buffers(queue, &[x, y], &[result], move || {
        unsafe { dot_kernel::<T>(n, px, incx, py, incy, pr) };
        Ok(())
    });
    Ok(())
}

// ============================================================================
// Erased table entries
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn gemm_usm_erased<T: Scalar>(
    queue: &Queue,
    ta: Transpose,
    tb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: *const u8,
    a: u64,
    lda: usize,
    b: u64,
    ldb: usize,
    beta: *const u8,
    c: u64,
    ldc: usize,
    deps: &[Event],
) -> Result<Event> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    gemm::<T>(queue, ta, tb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc, deps)
}

#[allow(clippy::too_many_arguments)]
fn gemm_buf_erased<T: Scalar>(
    queue: &Queue,
    ta: Transpose,
    tb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: *const u8,
    a: RawBuf<'_>,
    lda: usize,
    b: RawBuf<'_>,
    ldb: usize,
    beta: *const u8,
    c: RawBuf<'_>,
    ldc: usize,
) -> Result<()> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    gemm_buf::<T>(queue, ta, tb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc)
}

#[allow(clippy::too_many_arguments)]
fn gemv_usm_erased<T: Scalar>(
    queue: &Queue,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: *const u8,
    a: u64,
    lda: usize,
    x: u64,
    incx: usize,
    beta: *const u8,
    y: u64,
    incy: usize,
    deps: &[Event],
) -> Result<Event> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    gemv::<T>(queue, trans, m, n, alpha, a, lda, x, incx, beta, y, incy, deps)
}

#[allow(clippy::too_many_arguments)]
fn gemv_buf_erased<T: Scalar>(
    queue: &Queue,
    trans: Transpose,
    m: usize,
    n: usize,
    alpha: *const u8,
    a: RawBuf<'_>,
    lda: usize,
    x: RawBuf<'_>,
    incx: usize,
    beta: *const u8,
    y: RawBuf<'_>,
    incy: usize,
) -> Result<()> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    gemv_buf::<T>(queue, trans, m, n, alpha, a, lda, x, incx, beta, y, incy)
}

#[allow(clippy::too_many_arguments)]
fn syrk_usm_erased<T: Scalar>(
    queue: &Queue,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: *const u8,
    a: u64,
    lda: usize,
    beta: *const u8,
    c: u64,
    ldc: usize,
    deps: &[Event],
) -> Result<Event> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    syrk::<T>(queue, uplo, trans, n, k, alpha, a, lda, beta, c, ldc, deps)
}

#[allow(clippy::too_many_arguments)]
fn syrk_buf_erased<T: Scalar>(
    queue: &Queue,
    uplo: UpLo,
    trans: Transpose,
    n: usize,
    k: usize,
    alpha: *const u8,
    a: RawBuf<'_>,
    lda: usize,
    beta: *const u8,
    c: RawBuf<'_>,
    ldc: usize,
) -> Result<()> {
    let (alpha, beta) = unsafe { (*(alpha as *const T), *(beta as *const T)) };
    syrk_buf::<T>(queue, uplo, trans, n, k, alpha, a, lda, beta, c, ldc)
}

#[allow(clippy::too_many_arguments)]
fn axpy_usm_erased<T: Scalar>(
    queue: &Queue,
    n: usize,
    alpha: *const u8,
    x: u64,
    incx: usize,
    y: u64,
    incy: usize,
    deps: &[Event],
) -> Result<Event> {
    let alpha = unsafe { *(alpha as *const T) };
    axpy::<T>(queue, n, alpha, x, incx, y, incy, deps)
}

fn axpy_buf_erased<T: Scalar>(
    queue: &Queue,
    n: usize,
    alpha: *const u8,
    x: RawBuf<'_>,
    incx: usize,
    y: RawBuf<'_>,
    incy: usize,
) -> Result<()> {
    let alpha = unsafe { *(alpha as *const T) };
    axpy_buf::<T>(queue, n, alpha, x, incx, y, incy)
}

#[allow(clippy::too_many_arguments)]
fn dot_usm_erased<T: Scalar>(
    queue: &Queue,
    n: usize,
    x: u64,
    incx: usize,
    y: u64,
    incy: usize,
    result: u64,
    deps: &[Event],
) -> Result<Event> {
    dot::<T>(queue, n, x, incx, y, incy, result, deps)
}

fn dot_buf_erased<T: Scalar>(
    queue: &Queue,
    n: usize,
    x: RawBuf<'_>,
    incx: usize,
    y: RawBuf<'_>,
    incy: usize,
    result: RawBuf<'_>,
) -> Result<()> {
    dot_buf::<T>(queue, n, x, incx, y, incy, result)
}

use super::all_types;

pub(crate) static TABLE: BlasTable = BlasTable {
    abi: ABI_VERSION,
    gemm: all_types!(gemm_usm_erased, GemmUsmFn),
    gemm_buf: all_types!(gemm_buf_erased, GemmBufFn),
    gemv: all_types!(gemv_usm_erased, GemvUsmFn),
    gemv_buf: all_types!(gemv_buf_erased, GemvBufFn),
    syrk: all_types!(syrk_usm_erased, SyrkUsmFn),
    syrk_buf: all_types!(syrk_buf_erased, SyrkBufFn),
    axpy: all_types!(axpy_usm_erased, AxpyUsmFn),
    axpy_buf: all_types!(axpy_buf_erased, AxpyBufFn),
    dot: all_types!(dot_usm_erased, DotUsmFn),
    dot_buf: all_types!(dot_buf_erased, DotBufFn),
};

// ============================================================================
// Compile-time entry points
// ============================================================================

impl CtBlas for CpuNative {
    fn gemm<T: Scalar>(
        queue: &Queue,
        ta: Transpose,
        tb: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: u64,
        lda: usize,
        b: u64,
        ldb: usize,
        beta: T,
        c: u64,
        ldc: usize,
        deps: &[Event],
    ) -> Result<Event> {
        gemm::<T>(queue, ta, tb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc, deps)
    }

    fn gemm_buf<T: Scalar>(
        queue: &Queue,
        ta: Transpose,
        tb: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &crate::buffer::Buffer<T>,
        lda: usize,
        b: &crate::buffer::Buffer<T>,
        ldb: usize,
        beta: T,
        c: &crate::buffer::Buffer<T>,
        ldc: usize,
    ) -> Result<()> {
        gemm_buf::<T>(
            queue,
            ta,
            tb,
            m,
            n,
            k,
            alpha,
            a.raw(),
            lda,
            b.raw(),
            ldb,
            beta,
            c.raw(),
            ldc,
        )
    }

    fn gemv<T: Scalar>(
        queue: &Queue,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: T,
        a: u64,
        lda: usize,
        x: u64,
        incx: usize,
        beta: T,
        y: u64,
        incy: usize,
        deps: &[Event],
    ) -> Result<Event> {
        gemv::<T>(queue, trans, m, n, alpha, a, lda, x, incx, beta, y, incy, deps)
    }

    fn gemv_buf<T: Scalar>(
        queue: &Queue,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: T,
        a: &crate::buffer::Buffer<T>,
        lda: usize,
        x: &crate::buffer::Buffer<T>,
        incx: usize,
        beta: T,
        y: &crate::buffer::Buffer<T>,
        incy: usize,
    ) -> Result<()> {
        gemv_buf::<T>(
            queue,
            trans,
            m,
            n,
            alpha,
            a.raw(),
            lda,
            x.raw(),
            incx,
            beta,
            y.raw(),
            incy,
        )
    }

    fn syrk<T: Scalar>(
        queue: &Queue,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        k: usize,
        alpha: T,
        a: u64,
        lda: usize,
        beta: T,
        c: u64,
        ldc: usize,
        deps: &[Event],
    ) -> Result<Event> {
        syrk::<T>(queue, uplo, trans, n, k, alpha, a, lda, beta, c, ldc, deps)
    }

    fn syrk_buf<T: Scalar>(
        queue: &Queue,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        k: usize,
        alpha: T,
        a: &crate::buffer::Buffer<T>,
        lda: usize,
        beta: T,
        c: &crate::buffer::Buffer<T>,
        ldc: usize,
    ) -> Result<()> {
        syrk_buf::<T>(queue, uplo, trans, n, k, alpha, a.raw(), lda, beta, c.raw(), ldc)
    }

    fn axpy<T: Scalar>(
        queue: &Queue,
        n: usize,
        alpha: T,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        deps: &[Event],
    ) -> Result<Event> {
        axpy::<T>(queue, n, alpha, x, incx, y, incy, deps)
    }

    fn axpy_buf<T: Scalar>(
        queue: &Queue,
        n: usize,
        alpha: T,
        x: &crate::buffer::Buffer<T>,
        incx: usize,
        y: &crate::buffer::Buffer<T>,
        incy: usize,
    ) -> Result<()> {
        axpy_buf::<T>(queue, n, alpha, x.raw(), incx, y.raw(), incy)
    }

    fn dot<T: Scalar>(
        queue: &Queue,
        n: usize,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        result: u64,
        deps: &[Event],
    ) -> Result<Event> {
        dot::<T>(queue, n, x, incx, y, incy, result, deps)
    }

    fn dot_buf<T: Scalar>(
        queue: &Queue,
        n: usize,
        x: &crate::buffer::Buffer<T>,
        incx: usize,
        y: &crate::buffer::Buffer<T>,
        incy: usize,
        result: &crate::buffer::Buffer<T>,
    ) -> Result<()> {
        dot_buf::<T>(queue, n, x.raw(), incx, y.raw(), incy, result.raw())
    }
}
