//! Dense BLAS facades
//!
//! Every operation is exposed once per layout convention; both facades
//! validate, rewrite their arguments through the layout adapter, and
//! call one column-major backend entry through whichever selector
//! strategy the caller passes. Explicit-pointer calls take a dependency
//! slice and return the completion event; `_buf` calls order themselves
//! through the managed containers and return nothing.

use crate::backend::identify;
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::layout;
use crate::scalar::Scalar;
use crate::select::BlasDispatch;
use crate::types::{Domain, Layout, Transpose, UpLo};

mod imp {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    pub(super) fn gemm<S: BlasDispatch, T: Scalar>(
        lay: Layout,
        sel: &S,
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
        layout::validate_gemm(lay, ta, tb, m, n, k, lda, ldb, ldc)?;
        let (nta, ntb, nm, nn, nk, swap) = layout::gemm_to_native(lay, ta, tb, m, n, k);
        if swap {
            sel.gemm(nta, ntb, nm, nn, nk, alpha, b, ldb, a, lda, beta, c, ldc, deps)
        } else {
            sel.gemm(nta, ntb, nm, nn, nk, alpha, a, lda, b, ldb, beta, c, ldc, deps)
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn gemm_buf<S: BlasDispatch, T: Scalar>(
        lay: Layout,
        sel: &S,
        ta: Transpose,
        tb: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &Buffer<T>,
        lda: usize,
        b: &Buffer<T>,
        ldb: usize,
        beta: T,
        c: &Buffer<T>,
        ldc: usize,
    ) -> Result<()> {
        layout::validate_gemm(lay, ta, tb, m, n, k, lda, ldb, ldc)?;
        let (nta, ntb, nm, nn, nk, swap) = layout::gemm_to_native(lay, ta, tb, m, n, k);
        if swap {
            sel.gemm_buf(nta, ntb, nm, nn, nk, alpha, b, ldb, a, lda, beta, c, ldc)
        } else {
            sel.gemm_buf(nta, ntb, nm, nn, nk, alpha, a, lda, b, ldb, beta, c, ldc)
        }
    }

    pub(super) fn gemv_unadaptable<S: BlasDispatch>(sel: &S) -> Error {
        Error::unimplemented(
            identify(sel.queue().device(), Domain::Blas),
            Domain::Blas,
            "gemv (row-major conjugate-transpose)",
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn gemv<S: BlasDispatch, T: Scalar>(
        lay: Layout,
        sel: &S,
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
        layout::validate_gemv(lay, m, n, lda, incx, incy)?;
        let (nt, nm, nn) = layout::gemv_to_native(lay, trans, m, n, T::DTYPE)
            .ok_or_else(|| gemv_unadaptable(sel))?;
        sel.gemv(nt, nm, nn, alpha, a, lda, x, incx, beta, y, incy, deps)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn gemv_buf<S: BlasDispatch, T: Scalar>(
        lay: Layout,
        sel: &S,
        trans: Transpose,
        m: usize,
        n: usize,
        alpha: T,
        a: &Buffer<T>,
        lda: usize,
        x: &Buffer<T>,
        incx: usize,
        beta: T,
        y: &Buffer<T>,
        incy: usize,
    ) -> Result<()> {
        layout::validate_gemv(lay, m, n, lda, incx, incy)?;
        let (nt, nm, nn) = layout::gemv_to_native(lay, trans, m, n, T::DTYPE)
            .ok_or_else(|| gemv_unadaptable(sel))?;
        sel.gemv_buf(nt, nm, nn, alpha, a, lda, x, incx, beta, y, incy)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn syrk<S: BlasDispatch, T: Scalar>(
        lay: Layout,
        sel: &S,
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
        layout::validate_syrk(lay, trans, n, k, lda, ldc)?;
        let (nu, nt) = layout::syrk_to_native(lay, uplo, trans);
        sel.syrk(nu, nt, n, k, alpha, a, lda, beta, c, ldc, deps)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn syrk_buf<S: BlasDispatch, T: Scalar>(
        lay: Layout,
        sel: &S,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        k: usize,
        alpha: T,
        a: &Buffer<T>,
        lda: usize,
        beta: T,
        c: &Buffer<T>,
        ldc: usize,
    ) -> Result<()> {
        layout::validate_syrk(lay, trans, n, k, lda, ldc)?;
        let (nu, nt) = layout::syrk_to_native(lay, uplo, trans);
        sel.syrk_buf(nu, nt, n, k, alpha, a, lda, beta, c, ldc)
    }
}

macro_rules! layout_facade {
    ($mod_name:ident, $layout:expr, $doc:literal) => {
        #[doc = $doc]
        pub mod $mod_name {
            use super::*;

            /// `C := alpha*op(A)*op(B) + beta*C`, explicit-pointer model.
            #[allow(clippy::too_many_arguments)]
            pub fn gemm<S: BlasDispatch, T: Scalar>(
                sel: &S,
                transa: Transpose,
                transb: Transpose,
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
                imp::gemm(
                    $layout, sel, transa, transb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc,
                    deps,
                )
            }

            /// `C := alpha*op(A)*op(B) + beta*C`, managed-buffer model.
            #[allow(clippy::too_many_arguments)]
            pub fn gemm_buf<S: BlasDispatch, T: Scalar>(
                sel: &S,
                transa: Transpose,
                transb: Transpose,
                m: usize,
                n: usize,
                k: usize,
                alpha: T,
                a: &Buffer<T>,
                lda: usize,
                b: &Buffer<T>,
                ldb: usize,
                beta: T,
                c: &Buffer<T>,
                ldc: usize,
            ) -> Result<()> {
                imp::gemm_buf(
                    $layout, sel, transa, transb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc,
                )
            }

            /// `y := alpha*op(A)*x + beta*y`, explicit-pointer model.
            #[allow(clippy::too_many_arguments)]
            pub fn gemv<S: BlasDispatch, T: Scalar>(
                sel: &S,
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
                imp::gemv(
                    $layout, sel, trans, m, n, alpha, a, lda, x, incx, beta, y, incy, deps,
                )
            }

            /// `y := alpha*op(A)*x + beta*y`, managed-buffer model.
            #[allow(clippy::too_many_arguments)]
            pub fn gemv_buf<S: BlasDispatch, T: Scalar>(
                sel: &S,
                trans: Transpose,
                m: usize,
                n: usize,
                alpha: T,
                a: &Buffer<T>,
                lda: usize,
                x: &Buffer<T>,
                incx: usize,
                beta: T,
                y: &Buffer<T>,
                incy: usize,
            ) -> Result<()> {
                imp::gemv_buf(
                    $layout, sel, trans, m, n, alpha, a, lda, x, incx, beta, y, incy,
                )
            }

            /// `C := alpha*op(A)*op(A)ᵗ + beta*C` on one triangle,
            /// explicit-pointer model.
            #[allow(clippy::too_many_arguments)]
            pub fn syrk<S: BlasDispatch, T: Scalar>(
                sel: &S,
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
                imp::syrk(
                    $layout, sel, uplo, trans, n, k, alpha, a, lda, beta, c, ldc, deps,
                )
            }

            /// `C := alpha*op(A)*op(A)ᵗ + beta*C` on one triangle,
            /// managed-buffer model.
            #[allow(clippy::too_many_arguments)]
            pub fn syrk_buf<S: BlasDispatch, T: Scalar>(
                sel: &S,
                uplo: UpLo,
                trans: Transpose,
                n: usize,
                k: usize,
                alpha: T,
                a: &Buffer<T>,
                lda: usize,
                beta: T,
                c: &Buffer<T>,
                ldc: usize,
            ) -> Result<()> {
                imp::syrk_buf(
                    $layout, sel, uplo, trans, n, k, alpha, a, lda, beta, c, ldc,
                )
            }

            /// `y := alpha*x + y`, explicit-pointer model. Vector
            /// operands have no layout; both facades are identical.
            #[allow(clippy::too_many_arguments)]
            pub fn axpy<S: BlasDispatch, T: Scalar>(
                sel: &S,
                n: usize,
                alpha: T,
                x: u64,
                incx: usize,
                y: u64,
                incy: usize,
                deps: &[Event],
            ) -> Result<Event> {
                crate::layout::validate_vectors(incx, incy)?;
                sel.axpy(n, alpha, x, incx, y, incy, deps)
            }

            /// `y := alpha*x + y`, managed-buffer model.
            pub fn axpy_buf<S: BlasDispatch, T: Scalar>(
                sel: &S,
                n: usize,
                alpha: T,
                x: &Buffer<T>,
                incx: usize,
                y: &Buffer<T>,
                incy: usize,
            ) -> Result<()> {
                crate::layout::validate_vectors(incx, incy)?;
                sel.axpy_buf(n, alpha, x, incx, y, incy)
            }

            /// Unconjugated dot product into a one-element device handle,
            /// explicit-pointer model.
            #[allow(clippy::too_many_arguments)]
            pub fn dot<S: BlasDispatch, T: Scalar>(
                sel: &S,
                n: usize,
                x: u64,
                incx: usize,
                y: u64,
                incy: usize,
                result: u64,
                deps: &[Event],
            ) -> Result<Event> {
                crate::layout::validate_vectors(incx, incy)?;
                sel.dot::<T>(n, x, incx, y, incy, result, deps)
            }

            /// Unconjugated dot product, managed-buffer model.
            pub fn dot_buf<S: BlasDispatch, T: Scalar>(
                sel: &S,
                n: usize,
                x: &Buffer<T>,
                incx: usize,
                y: &Buffer<T>,
                incy: usize,
                result: &Buffer<T>,
            ) -> Result<()> {
                crate::layout::validate_vectors(incx, incy)?;
                sel.dot_buf(n, x, incx, y, incy, result)
            }
        }
    };
}

layout_facade!(
    row_major,
    Layout::RowMajor,
    "Row-major facade over the column-major native entries."
);
layout_facade!(
    column_major,
    Layout::ColMajor,
    "Column-major facade, the backends' native convention."
);
