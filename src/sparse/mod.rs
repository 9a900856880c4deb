//! Sparse BLAS facades
//!
//! Operands are three-array compressed storage. The row-major facade
//! reads the arrays as CSR, the backends' native format; the
//! column-major facade reads the same arrays as CSC, which is the CSR
//! storage of the transpose, so the layout adapter turns it into a flag
//! flip and a dimension swap with no data movement.
//!
//! `trsv` is declared by the table ABI but implemented by no built
//! backend; dispatching it reports `UnimplementedOperation`, the signal
//! callers use to fall back per-operation.

use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::layout;
use crate::scalar::RealScalar;
use crate::select::{SparseDispatch, SparseTriDispatch};
use crate::types::{Layout, Transpose, UpLo};

fn check_dims(nrows: usize, ncols: usize) -> Result<()> {
    if nrows == 0 || ncols == 0 {
        return Err(Error::invalid_arg("nrows/ncols", "matrix must be non-empty"));
    }
    Ok(())
}

mod imp {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    pub(super) fn spmv<S: SparseDispatch, T: RealScalar>(
        lay: Layout,
        sel: &S,
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
        check_dims(nrows, ncols)?;
        let (nt, nr, nc) = layout::spmv_to_native(lay, trans, nrows, ncols);
        sel.spmv(nt, nr, nc, alpha, row_ptr, col_ind, values, x, beta, y, deps)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn spmv_buf<S: SparseDispatch, T: RealScalar>(
        lay: Layout,
        sel: &S,
        trans: Transpose,
        nrows: usize,
        ncols: usize,
        alpha: T,
        row_ptr: &Buffer<i64>,
        col_ind: &Buffer<i64>,
        values: &Buffer<T>,
        x: &Buffer<T>,
        beta: T,
        y: &Buffer<T>,
    ) -> Result<()> {
        check_dims(nrows, ncols)?;
        let (nt, nr, nc) = layout::spmv_to_native(lay, trans, nrows, ncols);
        sel.spmv_buf(nt, nr, nc, alpha, row_ptr, col_ind, values, x, beta, y)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn trsv<S: SparseTriDispatch, T: RealScalar>(
        lay: Layout,
        sel: &S,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        row_ptr: u64,
        col_ind: u64,
        values: u64,
        x: u64,
        deps: &[Event],
    ) -> Result<Event> {
        check_dims(n, n)?;
        let (nt, _, _) = layout::spmv_to_native(lay, trans, n, n);
        let nu = match lay {
            Layout::RowMajor => uplo,
            Layout::ColMajor => layout::flip_uplo(uplo),
        };
        sel.trsv::<T>(nu, nt, n, row_ptr, col_ind, values, x, deps)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn trsv_buf<S: SparseTriDispatch, T: RealScalar>(
        lay: Layout,
        sel: &S,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        row_ptr: &Buffer<i64>,
        col_ind: &Buffer<i64>,
        values: &Buffer<T>,
        x: &Buffer<T>,
    ) -> Result<()> {
        check_dims(n, n)?;
        let (nt, _, _) = layout::spmv_to_native(lay, trans, n, n);
        let nu = match lay {
            Layout::RowMajor => uplo,
            Layout::ColMajor => layout::flip_uplo(uplo),
        };
        sel.trsv_buf::<T>(nu, nt, n, row_ptr, col_ind, values, x)
    }
}

macro_rules! sparse_facade {
    ($mod_name:ident, $layout:expr, $doc:literal) => {
        #[doc = $doc]
        pub mod $mod_name {
            use super::*;

            /// `y := alpha*op(A)*x + beta*y`, explicit-pointer model.
            #[allow(clippy::too_many_arguments)]
            pub fn spmv<S: SparseDispatch, T: RealScalar>(
                sel: &S,
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
                imp::spmv(
                    $layout, sel, trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta,
                    y, deps,
                )
            }

            /// `y := alpha*op(A)*x + beta*y`, managed-buffer model.
            #[allow(clippy::too_many_arguments)]
            pub fn spmv_buf<S: SparseDispatch, T: RealScalar>(
                sel: &S,
                trans: Transpose,
                nrows: usize,
                ncols: usize,
                alpha: T,
                row_ptr: &Buffer<i64>,
                col_ind: &Buffer<i64>,
                values: &Buffer<T>,
                x: &Buffer<T>,
                beta: T,
                y: &Buffer<T>,
            ) -> Result<()> {
                imp::spmv_buf(
                    $layout, sel, trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta, y,
                )
            }

            /// Solve `op(T)*x = b` in place over a triangular matrix,
            /// explicit-pointer model.
            #[allow(clippy::too_many_arguments)]
            pub fn trsv<S: SparseTriDispatch, T: RealScalar>(
                sel: &S,
                uplo: UpLo,
                trans: Transpose,
                n: usize,
                row_ptr: u64,
                col_ind: u64,
                values: u64,
                x: u64,
                deps: &[Event],
            ) -> Result<Event> {
                imp::trsv::<S, T>(
                    $layout, sel, uplo, trans, n, row_ptr, col_ind, values, x, deps,
                )
            }

            /// Triangular solve, managed-buffer model.
            #[allow(clippy::too_many_arguments)]
            pub fn trsv_buf<S: SparseTriDispatch, T: RealScalar>(
                sel: &S,
                uplo: UpLo,
                trans: Transpose,
                n: usize,
                row_ptr: &Buffer<i64>,
                col_ind: &Buffer<i64>,
                values: &Buffer<T>,
                x: &Buffer<T>,
            ) -> Result<()> {
                imp::trsv_buf($layout, sel, uplo, trans, n, row_ptr, col_ind, values, x)
            }
        }
    };
}

sparse_facade!(
    row_major,
    Layout::RowMajor,
    "CSR facade, the backends' native reading of the three arrays."
);
sparse_facade!(
    column_major,
    Layout::ColMajor,
    "CSC facade over the same arrays, adapted onto the CSR entries."
);
