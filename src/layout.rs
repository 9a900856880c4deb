//! Layout adapter
//!
//! Pure argument rewrites between the row-major outward convention and
//! the column-major convention the native entry points expect, plus the
//! synchronous argument validation every facade performs before any
//! device submission. Only metadata is transformed; floating-point
//! values are never touched.
//!
//! The level-3 identity behind the rewrites: a row-major matrix viewed
//! column-major is its transpose, so
//! `row_major: C = op(A)·op(B)` equals
//! `col_major: Cᵗ = op(B)ᵗ·op(A)ᵗ`, i.e. the same call with operands
//! swapped and the output dimensions exchanged. Level-2 rewrites flip
//! the transpose flag instead; triangular fill designators flip side.
//!
//! Rewrites that would require data movement or a conjugation pass are
//! not expressible as metadata; those return `None` and the facade
//! reports the operation unimplemented for that layout.

use crate::error::{Error, Result};
use crate::types::{DataType, Layout, Transpose, UpLo};

/// Flip a transpose flag under the row/column reinterpretation.
///
/// Conjugate-transpose is not flippable by metadata alone; callers that
/// can accept it handle it before flipping.
#[inline]
pub(crate) fn flip(t: Transpose) -> Transpose {
    match t {
        Transpose::NoTrans => Transpose::Trans,
        Transpose::Trans => Transpose::NoTrans,
        Transpose::ConjTrans => Transpose::ConjTrans,
    }
}

/// Flip an upper/lower designator under the row/column reinterpretation.
#[inline]
pub(crate) fn flip_uplo(u: UpLo) -> UpLo {
    match u {
        UpLo::Upper => UpLo::Lower,
        UpLo::Lower => UpLo::Upper,
    }
}

#[inline]
fn at_least_one(x: usize) -> usize {
    x.max(1)
}

fn check_ld(arg: &'static str, ld: usize, rows: usize) -> Result<()> {
    if ld < at_least_one(rows) {
        return Err(Error::invalid_arg(
            arg,
            format!("leading dimension {} < {}", ld, at_least_one(rows)),
        ));
    }
    Ok(())
}

fn check_inc(arg: &'static str, inc: usize) -> Result<()> {
    if inc == 0 {
        return Err(Error::invalid_arg(arg, "stride must be positive"));
    }
    Ok(())
}

// ============================================================================
// Level 3
// ============================================================================

/// Stored row count of `op(A)` for an `r x c` operand in `layout`.
#[inline]
fn stored_rows(layout: Layout, trans: Transpose, r: usize, c: usize) -> usize {
    match layout {
        Layout::ColMajor => match trans {
            Transpose::NoTrans => r,
            _ => c,
        },
        // row-major stores the other extent contiguously
        Layout::RowMajor => match trans {
            Transpose::NoTrans => c,
            _ => r,
        },
    }
}

/// Validate gemm shapes and leading dimensions for the given layout.
#[allow(clippy::too_many_arguments)]
pub(crate) fn validate_gemm(
    layout: Layout,
    ta: Transpose,
    tb: Transpose,
    m: usize,
    n: usize,
    k: usize,
    lda: usize,
    ldb: usize,
    ldc: usize,
) -> Result<()> {
    check_ld("lda", lda, stored_rows(layout, ta, m, k))?;
    check_ld("ldb", ldb, stored_rows(layout, tb, k, n))?;
    let c_rows = match layout {
        Layout::ColMajor => m,
        Layout::RowMajor => n,
    };
    check_ld("ldc", ldc, c_rows)
}

/// Rewrite a gemm call onto the column-major native entry.
///
/// Returns the native `(ta, tb, m, n, k)` plus whether the A/B operands
/// (and their leading dimensions) exchange positions. Valid for all
/// transpose flags including conjugate-transpose.
pub(crate) fn gemm_to_native(
    layout: Layout,
    ta: Transpose,
    tb: Transpose,
    m: usize,
    n: usize,
    k: usize,
) -> (Transpose, Transpose, usize, usize, usize, bool) {
    match layout {
        Layout::ColMajor => (ta, tb, m, n, k, false),
        Layout::RowMajor => (tb, ta, n, m, k, true),
    }
}

/// Validate syrk arguments. Conjugate-transpose is outside syrk's
/// domain for every scalar type.
pub(crate) fn validate_syrk(
    layout: Layout,
    trans: Transpose,
    n: usize,
    k: usize,
    lda: usize,
    ldc: usize,
) -> Result<()> {
    if trans == Transpose::ConjTrans {
        return Err(Error::invalid_arg(
            "trans",
            "syrk accepts NoTrans or Trans only",
        ));
    }
    check_ld("lda", lda, stored_rows(layout, trans, n, k))?;
    check_ld("ldc", ldc, n)
}

/// Rewrite a syrk call onto the column-major native entry: both the fill
/// designator and the transpose flag flip; dimensions are unchanged.
pub(crate) fn syrk_to_native(layout: Layout, uplo: UpLo, trans: Transpose) -> (UpLo, Transpose) {
    match layout {
        Layout::ColMajor => (uplo, trans),
        Layout::RowMajor => (flip_uplo(uplo), flip(trans)),
    }
}

// ============================================================================
// Level 2
// ============================================================================

/// Validate gemv arguments for the given layout.
pub(crate) fn validate_gemv(
    layout: Layout,
    m: usize,
    n: usize,
    lda: usize,
    incx: usize,
    incy: usize,
) -> Result<()> {
    let rows = match layout {
        Layout::ColMajor => m,
        Layout::RowMajor => n,
    };
    check_ld("lda", lda, rows)?;
    check_inc("incx", incx)?;
    check_inc("incy", incy)
}

/// Rewrite a gemv call onto the column-major native entry.
///
/// Row-major flips the transpose flag and exchanges the dimension roles.
/// Row-major conjugate-transpose would need a conjugation pass on top of
/// the flip for complex operands, which metadata cannot express; real
/// operands degrade it to a plain transpose.
pub(crate) fn gemv_to_native(
    layout: Layout,
    trans: Transpose,
    m: usize,
    n: usize,
    dtype: DataType,
) -> Option<(Transpose, usize, usize)> {
    match layout {
        Layout::ColMajor => Some((trans, m, n)),
        Layout::RowMajor => {
            let trans = match (trans, dtype) {
                (Transpose::ConjTrans, DataType::C32 | DataType::C64) => return None,
                (Transpose::ConjTrans, _) => Transpose::Trans,
                (t, _) => t,
            };
            Some((flip(trans), n, m))
        }
    }
}

// ============================================================================
// Level 1
// ============================================================================

/// Validate the shared level-1 vector arguments. Vector operands have no
/// layout concept and pass through both facades unchanged.
pub(crate) fn validate_vectors(incx: usize, incy: usize) -> Result<()> {
    check_inc("incx", incx)?;
    check_inc("incy", incy)
}

// ============================================================================
// Sparse
// ============================================================================

/// Rewrite a sparse matrix-vector call onto the CSR-native entry.
///
/// The column-major facade interprets the three arrays as CSC, which is
/// exactly the CSR storage of the transpose, so the rewrite flips the
/// transpose flag and exchanges the dimension roles. Sparse entries are
/// real-only; conjugate-transpose degrades to transpose.
pub(crate) fn spmv_to_native(
    layout: Layout,
    trans: Transpose,
    nrows: usize,
    ncols: usize,
) -> (Transpose, usize, usize) {
    let trans = match trans {
        Transpose::ConjTrans => Transpose::Trans,
        t => t,
    };
    match layout {
        Layout::RowMajor => (trans, nrows, ncols),
        Layout::ColMajor => (flip(trans), ncols, nrows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ----- level 3 -----

    #[test]
    fn test_gemm_col_major_is_identity() {
        let (ta, tb, m, n, k, swap) = gemm_to_native(
            Layout::ColMajor,
            Transpose::Trans,
            Transpose::NoTrans,
            3,
            4,
            5,
        );
        assert_eq!((ta, tb, m, n, k, swap), (Transpose::Trans, Transpose::NoTrans, 3, 4, 5, false));
    }

    #[test]
    fn test_gemm_row_major_swaps_operands_not_flags() {
        let (ta, tb, m, n, k, swap) = gemm_to_native(
            Layout::RowMajor,
            Transpose::Trans,
            Transpose::ConjTrans,
            3,
            4,
            5,
        );
        // operands exchange, flags travel with their operand
        assert_eq!(ta, Transpose::ConjTrans);
        assert_eq!(tb, Transpose::Trans);
        assert_eq!((m, n, k), (4, 3, 5));
        assert!(swap);
    }

    #[test]
    fn test_syrk_row_major_flips_fill_and_trans() {
        assert_eq!(
            syrk_to_native(Layout::RowMajor, UpLo::Upper, Transpose::NoTrans),
            (UpLo::Lower, Transpose::Trans)
        );
        assert_eq!(
            syrk_to_native(Layout::RowMajor, UpLo::Lower, Transpose::Trans),
            (UpLo::Upper, Transpose::NoTrans)
        );
        assert_eq!(
            syrk_to_native(Layout::ColMajor, UpLo::Upper, Transpose::Trans),
            (UpLo::Upper, Transpose::Trans)
        );
    }

    #[test]
    fn test_syrk_rejects_conj_trans() {
        let err = validate_syrk(Layout::ColMajor, Transpose::ConjTrans, 4, 2, 4, 4).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { arg: "trans", .. }));
    }

    #[test]
    fn test_gemm_ld_validation_per_layout() {
        // col-major 3x5 times 5x4: lda >= 3
        assert!(validate_gemm(
            Layout::ColMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            3,
            4,
            5,
            2,
            5,
            3
        )
        .is_err());
        // row-major same shapes: lda >= 5 (k contiguous)
        assert!(validate_gemm(
            Layout::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            3,
            4,
            5,
            5,
            4,
            4
        )
        .is_ok());
        assert!(validate_gemm(
            Layout::RowMajor,
            Transpose::NoTrans,
            Transpose::NoTrans,
            3,
            4,
            5,
            3,
            4,
            4
        )
        .is_err());
    }

    // ----- level 2 -----

    #[test]
    fn test_gemv_row_major_flips() {
        assert_eq!(
            gemv_to_native(Layout::RowMajor, Transpose::NoTrans, 3, 5, DataType::F64),
            Some((Transpose::Trans, 5, 3))
        );
        assert_eq!(
            gemv_to_native(Layout::RowMajor, Transpose::Trans, 3, 5, DataType::F64),
            Some((Transpose::NoTrans, 5, 3))
        );
    }

    #[test]
    fn test_gemv_conj_real_degrades_complex_refuses() {
        assert_eq!(
            gemv_to_native(Layout::RowMajor, Transpose::ConjTrans, 3, 5, DataType::F32),
            Some((Transpose::NoTrans, 5, 3))
        );
        assert_eq!(
            gemv_to_native(Layout::RowMajor, Transpose::ConjTrans, 3, 5, DataType::C64),
            None
        );
        // column-major conjugate-transpose is native, no rewrite needed
        assert_eq!(
            gemv_to_native(Layout::ColMajor, Transpose::ConjTrans, 3, 5, DataType::C64),
            Some((Transpose::ConjTrans, 3, 5))
        );
    }

    // ----- level 1 -----

    #[test]
    fn test_vector_strides_must_be_positive() {
        assert!(validate_vectors(1, 1).is_ok());
        assert!(validate_vectors(0, 1).is_err());
        assert!(validate_vectors(1, 0).is_err());
    }

    // ----- sparse -----

    #[test]
    fn test_spmv_csc_is_csr_of_transpose() {
        assert_eq!(
            spmv_to_native(Layout::ColMajor, Transpose::NoTrans, 3, 5),
            (Transpose::Trans, 5, 3)
        );
        assert_eq!(
            spmv_to_native(Layout::ColMajor, Transpose::Trans, 3, 5),
            (Transpose::NoTrans, 5, 3)
        );
        assert_eq!(
            spmv_to_native(Layout::RowMajor, Transpose::ConjTrans, 3, 5),
            (Transpose::Trans, 3, 5)
        );
    }
}
