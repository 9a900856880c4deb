//! Dense factorization facades
//!
//! Column-major only: factorizations pivot on storage order, and no
//! metadata-only rewrite maps a row-major call onto these entries, so
//! the layout pairing that BLAS carries does not exist here.
//!
//! `getri` takes a caller-allocated scratchpad sized by a prior
//! [`getri_scratchpad_size`] query; the core never allocates device
//! memory on a caller's behalf.

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::scalar::RealScalar;
use crate::select::LapackDispatch;
use crate::types::UpLo;

fn check_ld(lda: usize, rows: usize) -> Result<()> {
    if lda < rows.max(1) {
        return Err(Error::invalid_arg(
            "lda",
            format!("leading dimension {} < {}", lda, rows.max(1)),
        ));
    }
    Ok(())
}

/// LU factorization with partial pivoting, in place; 0-based pivot
/// indices are written to `ipiv` (length `min(m, n)`).
pub fn getrf<S: LapackDispatch, T: RealScalar>(
    sel: &S,
    m: usize,
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
    deps: &[Event],
) -> Result<Event> {
    check_ld(lda, m)?;
    sel.getrf::<T>(m, n, a, lda, ipiv, deps)
}

/// LU factorization, managed-buffer model.
pub fn getrf_buf<S: LapackDispatch, T: RealScalar>(
    sel: &S,
    m: usize,
    n: usize,
    a: &Buffer<T>,
    lda: usize,
    ipiv: &Buffer<i64>,
) -> Result<()> {
    check_ld(lda, m)?;
    if ipiv.len() < m.min(n) {
        return Err(Error::invalid_arg("ipiv", "buffer shorter than min(m, n)"));
    }
    sel.getrf_buf::<T>(m, n, a, lda, ipiv)
}

/// Scratch element count a subsequent [`getri`] call needs.
pub fn getri_scratchpad_size<S: LapackDispatch, T: RealScalar>(
    sel: &S,
    n: usize,
    lda: usize,
) -> Result<usize> {
    check_ld(lda, n)?;
    sel.getri_scratchpad_size::<T>(n, lda)
}

/// Matrix inverse from [`getrf`] output, in place over `a`.
#[allow(clippy::too_many_arguments)]
pub fn getri<S: LapackDispatch, T: RealScalar>(
    sel: &S,
    n: usize,
    a: u64,
    lda: usize,
    ipiv: u64,
    scratch: u64,
    scratch_len: usize,
    deps: &[Event],
) -> Result<Event> {
    check_ld(lda, n)?;
    sel.getri::<T>(n, a, lda, ipiv, scratch, scratch_len, deps)
}

/// Matrix inverse, managed-buffer model.
pub fn getri_buf<S: LapackDispatch, T: RealScalar>(
    sel: &S,
    n: usize,
    a: &Buffer<T>,
    lda: usize,
    ipiv: &Buffer<i64>,
    scratch: &Buffer<T>,
) -> Result<()> {
    check_ld(lda, n)?;
    sel.getri_buf::<T>(n, a, lda, ipiv, scratch, scratch.len())
}

/// Cholesky factorization of one triangle, in place.
pub fn potrf<S: LapackDispatch, T: RealScalar>(
    sel: &S,
    uplo: UpLo,
    n: usize,
    a: u64,
    lda: usize,
    deps: &[Event],
) -> Result<Event> {
    check_ld(lda, n)?;
    sel.potrf::<T>(uplo, n, a, lda, deps)
}

/// Cholesky factorization, managed-buffer model.
pub fn potrf_buf<S: LapackDispatch, T: RealScalar>(
    sel: &S,
    uplo: UpLo,
    n: usize,
    a: &Buffer<T>,
    lda: usize,
) -> Result<()> {
    check_ld(lda, n)?;
    sel.potrf_buf::<T>(uplo, n, a, lda)
}
