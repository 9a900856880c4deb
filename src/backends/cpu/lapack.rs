//! CPU reference factorization kernels and table
//!
//! Unblocked column-major implementations: LU with partial pivoting
//! (Doolittle), inverse by per-column solves against the LU factors, and
//! Cholesky-Banachiewicz. Pivot indices are 0-based. A zero pivot or a
//! non-positive-definite minor is reported through the completion event
//! as an execution failure, carrying the offending column.

use super::CpuNative;
use crate::buffer::RawBuf;
use crate::dispatch::tables::{
    GetrfBufFn, GetrfUsmFn, GetriBufFn, GetriScratchFn, GetriUsmFn, LapackTable, PotrfBufFn,
    PotrfUsmFn, ABI_VERSION,
};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::exec::{enqueue, enqueue_buffers};
use crate::queue::Queue;
use crate::scalar::{RealScalar, Scalar};
use crate::select::CtLapack;
use crate::types::UpLo;

// ============================================================================
// Kernels
// ============================================================================

/// # Safety
/// `a` valid for `lda * n` elements, `ipiv` for `min(m, n)` writes.
unsafe fn getrf_kernel<T: RealScalar>(
    m: usize,
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
) -> Result<()> {
    let ap = a as *mut T;
    let pivp = ipiv as *mut i64;
    let kmin = m.min(n);

    for col in 0..kmin {
        // pivot: largest magnitude in column col, rows col..m
        let mut piv = col;
        let mut max = (*ap.add(col + col * lda)).abs_val();
        for r in (col + 1)..m {
            let v = (*ap.add(r + col * lda)).abs_val();
            if v > max {
                max = v;
                piv = r;
            }
        }
        *pivp.add(col) = piv as i64;

        if piv != col {
            for j in 0..n {
                let x = *ap.add(col + j * lda);
                *ap.add(col + j * lda) = *ap.add(piv + j * lda);
                *ap.add(piv + j * lda) = x;
            }
        }

        let pivot = *ap.add(col + col * lda);
        if pivot == <T as Scalar>::zero() {
            return Err(Error::execution(format!(
                "getrf: U({},{}) is exactly zero",
                col, col
            )));
        }

        for r in (col + 1)..m {
            *ap.add(r + col * lda) = *ap.add(r + col * lda) / pivot;
        }
        for j in (col + 1)..n {
            let ucol = *ap.add(col + j * lda);
            for r in (col + 1)..m {
                *ap.add(r + j * lda) = *ap.add(r + j * lda) - *ap.add(r + col * lda) * ucol;
            }
        }
    }
    Ok(())
}

/// # Safety
/// `a` valid for `lda * n`, `ipiv` for `n` reads, `scratch` for `n * n`.
unsafe fn getri_kernel<T: RealScalar>(
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
    scratch: u64,
) -> Result<()> {
    let ap = a as *mut T;
    let pivp = ipiv as *const i64;
    let lu = scratch as *mut T;

    // compact copy of the factors; the output overwrites `a`
    for j in 0..n {
        for i in 0..n {
            *lu.add(i + j * n) = *ap.add(i + j * lda);
        }
    }
    for i in 0..n {
        if *lu.add(i + i * n) == <T as Scalar>::zero() {
            return Err(Error::execution(format!(
                "getri: U({},{}) is exactly zero, matrix is singular",
                i, i
            )));
        }
    }

    let mut col = vec![<T as Scalar>::zero(); n];
    for j in 0..n {
        col.fill(<T as Scalar>::zero());
        col[j] = <T as Scalar>::one();
        // apply the recorded row interchanges to the unit vector
        for k in 0..n {
            let p = *pivp.add(k) as usize;
            if p != k {
                col.swap(k, p);
            }
        }
        // forward substitution, unit lower triangle
        for i in 0..n {
            let mut s = col[i];
            for l in 0..i {
                s = s - *lu.add(i + l * n) * col[l];
            }
            col[i] = s;
        }
        // back substitution
        for i in (0..n).rev() {
            let mut s = col[i];
            for l in (i + 1)..n {
                s = s - *lu.add(i + l * n) * col[l];
            }
            col[i] = s / *lu.add(i + i * n);
        }
        for i in 0..n {
            *ap.add(i + j * lda) = col[i];
        }
    }
    Ok(())
}

/// # Safety
/// `a` valid for `lda * n` elements; only the `uplo` triangle is touched.
unsafe fn potrf_kernel<T: RealScalar>(uplo: UpLo, n: usize, a: u64, lda: usize) -> Result<()> {
    let ap = a as *mut T;
    let not_pd = |order: usize| {
        Error::execution(format!(
            "potrf: leading minor of order {} is not positive definite",
            order
        ))
    };

    match uplo {
        UpLo::Lower => {
            for j in 0..n {
                let mut d = *ap.add(j + j * lda);
                for k in 0..j {
                    let l = *ap.add(j + k * lda);
                    d = d - l * l;
                }
                if d <= <T as Scalar>::zero() {
                    return Err(not_pd(j + 1));
                }
                let ljj = d.sqrt();
                *ap.add(j + j * lda) = ljj;
                for i in (j + 1)..n {
                    let mut s = *ap.add(i + j * lda);
                    for k in 0..j {
                        s = s - *ap.add(i + k * lda) * *ap.add(j + k * lda);
                    }
                    *ap.add(i + j * lda) = s / ljj;
                }
            }
        }
        UpLo::Upper => {
            for j in 0..n {
                for i in 0..j {
                    let mut s = *ap.add(i + j * lda);
                    for k in 0..i {
                        s = s - *ap.add(k + i * lda) * *ap.add(k + j * lda);
                    }
                    *ap.add(i + j * lda) = s / *ap.add(i + i * lda);
                }
                let mut d = *ap.add(j + j * lda);
                for k in 0..j {
                    let u = *ap.add(k + j * lda);
                    d = d - u * u;
                }
                if d <= <T as Scalar>::zero() {
                    return Err(not_pd(j + 1));
                }
                *ap.add(j + j * lda) = d.sqrt();
            }
        }
    }
    Ok(())
}

// ============================================================================
// Typed entry points
// ============================================================================

pub(crate) fn getrf<T: RealScalar>(
    queue: &Queue,
    m: usize,
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || unsafe {
        getrf_kernel::<T>(m, n, a, lda, ipiv)
    }))
}

pub(crate) fn getrf_buf<T: RealScalar>(
    queue: &Queue,
    m: usize,
    n: usize,
    a: RawBuf<'_>,
    lda: usize,
    ipiv: RawBuf<'_>,
) -> Result<()> {
    let (pa, ppiv) = (a.ptr, ipiv.ptr);
    enqueue_buffers(queue, &[], &[a, ipiv], move || unsafe {
        getrf_kernel::<T>(m, n, pa, lda, ppiv)
    });
    Ok(())
}

pub(crate) fn scratchpad_len(n: usize, _lda: usize) -> usize {
    n * n
}

fn check_scratch(n: usize, scratch_len: usize) -> Result<()> {
    if scratch_len < scratchpad_len(n, n) {
        return Err(Error::invalid_arg(
            "scratch_len",
            format!(
                "getri needs {} elements, got {}",
                scratchpad_len(n, n),
                scratch_len
            ),
        ));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn getri<T: RealScalar>(
    queue: &Queue,
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
    scratch: u64,
    scratch_len: usize,
    deps: &[Event],
) -> Result<Event> {
    check_scratch(n, scratch_len)?;
    Ok(enqueue(queue, deps, move || unsafe {
        getri_kernel::<T>(n, a, lda, ipiv, scratch)
    }))
}

pub(crate) fn getri_buf<T: RealScalar>(
    queue: &Queue,
    n: usize,
    a: RawBuf<'_>,
    lda: usize,
    ipiv: RawBuf<'_>,
    scratch: RawBuf<'_>,
    scratch_len: usize,
) -> Result<()> {
    check_scratch(n, scratch_len)?;
    let (pa, ppiv, ps) = (a.ptr, ipiv.ptr, scratch.ptr);
    enqueue_buffers(queue, &[ipiv], &[a, scratch], move || unsafe {
        getri_kernel::<T>(n, pa, lda, ppiv, ps)
    });
    Ok(())
}

pub(crate) fn potrf<T: RealScalar>(
    queue: &Queue,
    uplo: UpLo,
    n: usize,
    a: u64,
    lda: usize,
    deps: &[Event],
) -> Result<Event> {
    Ok(enqueue(queue, deps, move || unsafe {
        potrf_kernel::<T>(uplo, n, a, lda)
    }))
}

pub(crate) fn potrf_buf<T: RealScalar>(
    queue: &Queue,
    uplo: UpLo,
    n: usize,
    a: RawBuf<'_>,
    lda: usize,
) -> Result<()> {
    let pa = a.ptr;
    enqueue_buffers(queue, &[], &[a], move || unsafe {
        potrf_kernel::<T>(uplo, n, pa, lda)
    });
    Ok(())
}

// ============================================================================
// Erased table entries
// ============================================================================

fn getrf_usm_erased<T: RealScalar>(
    queue: &Queue,
    m: usize,
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
    deps: &[Event],
) -> Result<Event> {
    getrf::<T>(queue, m, n, a, lda, ipiv, deps)
}

fn getrf_buf_erased<T: RealScalar>(
    queue: &Queue,
    m: usize,
    n: usize,
    a: RawBuf<'_>,
    lda: usize,
    ipiv: RawBuf<'_>,
) -> Result<()> {
    getrf_buf::<T>(queue, m, n, a, lda, ipiv)
}

#[allow(clippy::too_many_arguments)]
fn getri_usm_erased<T: RealScalar>(
    queue: &Queue,
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
    scratch: u64,
    scratch_len: usize,
    deps: &[Event],
) -> Result<Event> {
    getri::<T>(queue, n, a, lda, ipiv, scratch, scratch_len, deps)
}

fn getri_buf_erased<T: RealScalar>(
    queue: &Queue,
    n: usize,
    a: RawBuf<'_>,
    lda: usize,
    ipiv: RawBuf<'_>,
    scratch: RawBuf<'_>,
    scratch_len: usize,
) -> Result<()> {
    getri_buf::<T>(queue, n, a, lda, ipiv, scratch, scratch_len)
}

fn getri_scratch_erased<T: RealScalar>(n: usize, lda: usize) -> usize {
    scratchpad_len(n, lda)
}

fn potrf_usm_erased<T: RealScalar>(
    queue: &Queue,
    uplo: UpLo,
    n: usize,
    a: u64,
    lda: usize,
    deps: &[Event],
) -> Result<Event> {
    potrf::<T>(queue, uplo, n, a, lda, deps)
}

fn potrf_buf_erased<T: RealScalar>(
    queue: &Queue,
    uplo: UpLo,
    n: usize,
    a: RawBuf<'_>,
    lda: usize,
) -> Result<()> {
    potrf_buf::<T>(queue, uplo, n, a, lda)
}

use super::real_types;

pub(crate) static TABLE: LapackTable = LapackTable {
    abi: ABI_VERSION,
    getrf: real_types!(getrf_usm_erased, GetrfUsmFn),
    getrf_buf: real_types!(getrf_buf_erased, GetrfBufFn),
    getri: real_types!(getri_usm_erased, GetriUsmFn),
    getri_buf: real_types!(getri_buf_erased, GetriBufFn),
    getri_scratchpad_size: real_types!(getri_scratch_erased, GetriScratchFn),
    potrf: real_types!(potrf_usm_erased, PotrfUsmFn),
    potrf_buf: real_types!(potrf_buf_erased, PotrfBufFn),
};

// ============================================================================
// Compile-time entry points
// ============================================================================

impl CtLapack for CpuNative {
    fn getrf<T: RealScalar>(
        queue: &Queue,
        m: usize,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        deps: &[Event],
    ) -> Result<Event> {
        getrf::<T>(queue, m, n, a, lda, ipiv, deps)
    }

    fn getrf_buf<T: RealScalar>(
        queue: &Queue,
        m: usize,
        n: usize,
        a: &crate::buffer::Buffer<T>,
        lda: usize,
        ipiv: &crate::buffer::Buffer<i64>,
    ) -> Result<()> {
        getrf_buf::<T>(queue, m, n, a.raw(), lda, ipiv.raw())
    }

    fn getri<T: RealScalar>(
        queue: &Queue,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        scratch: u64,
        scratch_len: usize,
        deps: &[Event],
    ) -> Result<Event> {
        getri::<T>(queue, n, a, lda, ipiv, scratch, scratch_len, deps)
    }

    fn getri_buf<T: RealScalar>(
        queue: &Queue,
        n: usize,
        a: &crate::buffer::Buffer<T>,
        lda: usize,
        ipiv: &crate::buffer::Buffer<i64>,
        scratch: &crate::buffer::Buffer<T>,
        scratch_len: usize,
    ) -> Result<()> {
        getri_buf::<T>(queue, n, a.raw(), lda, ipiv.raw(), scratch.raw(), scratch_len)
    }

    fn getri_scratchpad_size<T: RealScalar>(n: usize, lda: usize) -> usize {
        scratchpad_len(n, lda)
    }

    fn potrf<T: RealScalar>(
        queue: &Queue,
        uplo: UpLo,
        n: usize,
        a: u64,
        lda: usize,
        deps: &[Event],
    ) -> Result<Event> {
        potrf::<T>(queue, uplo, n, a, lda, deps)
    }

    fn potrf_buf<T: RealScalar>(
        queue: &Queue,
        uplo: UpLo,
        n: usize,
        a: &crate::buffer::Buffer<T>,
        lda: usize,
    ) -> Result<()> {
        potrf_buf::<T>(queue, uplo, n, a.raw(), lda)
    }
}
