//! Compile-time backend selection
//!
//! A backend compiled into this crate exposes its entry points through
//! the `Ct*` capability traits on a zero-sized marker type. `Static<B>`
//! wraps a queue together with that marker; facade calls monomorphize
//! straight into the backend's functions with no identification, no
//! table, and no indirect call. An operation the backend does not
//! provide has no trait impl or no satisfiable scalar bound, so the call
//! site fails to build instead of failing at run time.

use super::{
    BlasDispatch, DftDispatch, LapackDispatch, RngDispatch, SparseDispatch,
};
use crate::buffer::Buffer;
use crate::error::Result;
use crate::event::Event;
use crate::queue::{Device, Queue};
use crate::rng::Engine;
use crate::scalar::{ComplexScalar, RealScalar, Scalar};
use crate::types::{Transpose, UpLo};
use std::marker::PhantomData;

/// Marker trait for a backend compiled into this build.
pub trait NativeBackend: Copy + Default + Send + Sync + 'static {
    /// Backend name for diagnostics.
    const NAME: &'static str;

    /// Whether a device is one this backend can serve.
    fn accepts(device: &Device) -> bool;
}

/// Dense level 1-3 entry points of a compiled-in backend.
#[allow(clippy::too_many_arguments)]
pub trait CtBlas: NativeBackend {
    /// See [`BlasDispatch::gemm`].
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
    ) -> Result<Event>;

    /// See [`BlasDispatch::gemm_buf`].
    fn gemm_buf<T: Scalar>(
        queue: &Queue,
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
    ) -> Result<()>;

    /// See [`BlasDispatch::gemv`].
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
    ) -> Result<Event>;

    /// See [`BlasDispatch::gemv_buf`].
    fn gemv_buf<T: Scalar>(
        queue: &Queue,
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
    ) -> Result<()>;

    /// See [`BlasDispatch::syrk`].
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
    ) -> Result<Event>;

    /// See [`BlasDispatch::syrk_buf`].
    fn syrk_buf<T: Scalar>(
        queue: &Queue,
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
    ) -> Result<()>;

    /// See [`BlasDispatch::axpy`].
    fn axpy<T: Scalar>(
        queue: &Queue,
        n: usize,
        alpha: T,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`BlasDispatch::axpy_buf`].
    fn axpy_buf<T: Scalar>(
        queue: &Queue,
        n: usize,
        alpha: T,
        x: &Buffer<T>,
        incx: usize,
        y: &Buffer<T>,
        incy: usize,
    ) -> Result<()>;

    /// See [`BlasDispatch::dot`].
    fn dot<T: Scalar>(
        queue: &Queue,
        n: usize,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        result: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`BlasDispatch::dot_buf`].
    fn dot_buf<T: Scalar>(
        queue: &Queue,
        n: usize,
        x: &Buffer<T>,
        incx: usize,
        y: &Buffer<T>,
        incy: usize,
        result: &Buffer<T>,
    ) -> Result<()>;
}

/// Dense factorization entry points of a compiled-in backend.
#[allow(clippy::too_many_arguments)]
pub trait CtLapack: NativeBackend {
    /// See [`LapackDispatch::getrf`].
    fn getrf<T: RealScalar>(
        queue: &Queue,
        m: usize,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`LapackDispatch::getrf_buf`].
    fn getrf_buf<T: RealScalar>(
        queue: &Queue,
        m: usize,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
        ipiv: &Buffer<i64>,
    ) -> Result<()>;

    /// See [`LapackDispatch::getri`].
    fn getri<T: RealScalar>(
        queue: &Queue,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        scratch: u64,
        scratch_len: usize,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`LapackDispatch::getri_buf`].
    fn getri_buf<T: RealScalar>(
        queue: &Queue,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
        ipiv: &Buffer<i64>,
        scratch: &Buffer<T>,
        scratch_len: usize,
    ) -> Result<()>;

    /// See [`LapackDispatch::getri_scratchpad_size`].
    fn getri_scratchpad_size<T: RealScalar>(n: usize, lda: usize) -> usize;

    /// See [`LapackDispatch::potrf`].
    fn potrf<T: RealScalar>(
        queue: &Queue,
        uplo: UpLo,
        n: usize,
        a: u64,
        lda: usize,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`LapackDispatch::potrf_buf`].
    fn potrf_buf<T: RealScalar>(
        queue: &Queue,
        uplo: UpLo,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
    ) -> Result<()>;
}

/// Random generation entry points of a compiled-in backend.
#[allow(clippy::too_many_arguments)]
pub trait CtRng: NativeBackend {
    /// See [`RngDispatch::uniform`].
    fn uniform<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`RngDispatch::uniform_buf`].
    fn uniform_buf<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()>;

    /// See [`RngDispatch::gaussian`].
    fn gaussian<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`RngDispatch::gaussian_buf`].
    fn gaussian_buf<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()>;
}

/// Transform entry points of a compiled-in backend.
pub trait CtDft: NativeBackend {
    /// See [`DftDispatch::forward`].
    fn forward<T: ComplexScalar>(
        queue: &Queue,
        n: usize,
        inout: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`DftDispatch::forward_buf`].
    fn forward_buf<T: ComplexScalar>(queue: &Queue, n: usize, inout: &Buffer<T>) -> Result<()>;

    /// See [`DftDispatch::backward`].
    fn backward<T: ComplexScalar>(
        queue: &Queue,
        n: usize,
        inout: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// See [`DftDispatch::backward_buf`].
    fn backward_buf<T: ComplexScalar>(queue: &Queue, n: usize, inout: &Buffer<T>) -> Result<()>;
}

/// Sparse entry points of a compiled-in backend.
#[allow(clippy::too_many_arguments)]
pub trait CtSparse: NativeBackend {
    /// See [`SparseDispatch::spmv`].
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
    ) -> Result<Event>;

    /// See [`SparseDispatch::spmv_buf`].
    fn spmv_buf<T: RealScalar>(
        queue: &Queue,
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
    ) -> Result<()>;
}

/// Compile-time selector binding a queue to one compiled-in backend.
pub struct Static<'q, B: NativeBackend> {
    queue: &'q Queue,
    _backend: PhantomData<B>,
}

impl<'q, B: NativeBackend> Static<'q, B> {
    /// Create a compile-time selector submitting on `queue`.
    ///
    /// The device/backend pairing is the caller's contract in a
    /// backend-homogeneous build; debug builds assert it.
    pub fn new(queue: &'q Queue) -> Self {
        debug_assert!(
            B::accepts(queue.device()),
            "queue device does not match backend {}",
            B::NAME
        );
        Self {
            queue,
            _backend: PhantomData,
        }
    }
}

impl<B: NativeBackend> Clone for Static<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: NativeBackend> Copy for Static<'_, B> {}

impl<B: CtBlas> BlasDispatch for Static<'_, B> {
    fn queue(&self) -> &Queue {
        self.queue
    }

    fn gemm<T: Scalar>(
        &self,
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
        B::gemm(
            self.queue, ta, tb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc, deps,
        )
    }

    fn gemm_buf<T: Scalar>(
        &self,
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
        B::gemm_buf(
            self.queue, ta, tb, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc,
        )
    }

    fn gemv<T: Scalar>(
        &self,
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
        B::gemv(
            self.queue, trans, m, n, alpha, a, lda, x, incx, beta, y, incy, deps,
        )
    }

    fn gemv_buf<T: Scalar>(
        &self,
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
        B::gemv_buf(
            self.queue, trans, m, n, alpha, a, lda, x, incx, beta, y, incy,
        )
    }

    fn syrk<T: Scalar>(
        &self,
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
        B::syrk(
            self.queue, uplo, trans, n, k, alpha, a, lda, beta, c, ldc, deps,
        )
    }

    fn syrk_buf<T: Scalar>(
        &self,
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
        B::syrk_buf(self.queue, uplo, trans, n, k, alpha, a, lda, beta, c, ldc)
    }

    fn axpy<T: Scalar>(
        &self,
        n: usize,
        alpha: T,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        deps: &[Event],
    ) -> Result<Event> {
        B::axpy(self.queue, n, alpha, x, incx, y, incy, deps)
    }

    fn axpy_buf<T: Scalar>(
        &self,
        n: usize,
        alpha: T,
        x: &Buffer<T>,
        incx: usize,
        y: &Buffer<T>,
        incy: usize,
    ) -> Result<()> {
        B::axpy_buf(self.queue, n, alpha, x, incx, y, incy)
    }

    fn dot<T: Scalar>(
        &self,
        n: usize,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        result: u64,
        deps: &[Event],
    ) -> Result<Event> {
        B::dot::<T>(self.queue, n, x, incx, y, incy, result, deps)
    }

    fn dot_buf<T: Scalar>(
        &self,
        n: usize,
        x: &Buffer<T>,
        incx: usize,
        y: &Buffer<T>,
        incy: usize,
        result: &Buffer<T>,
    ) -> Result<()> {
        B::dot_buf(self.queue, n, x, incx, y, incy, result)
    }
}

impl<B: CtLapack> LapackDispatch for Static<'_, B> {
    fn queue(&self) -> &Queue {
        self.queue
    }

    fn getrf<T: RealScalar>(
        &self,
        m: usize,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        deps: &[Event],
    ) -> Result<Event> {
        B::getrf::<T>(self.queue, m, n, a, lda, ipiv, deps)
    }

    fn getrf_buf<T: RealScalar>(
        &self,
        m: usize,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
        ipiv: &Buffer<i64>,
    ) -> Result<()> {
        B::getrf_buf(self.queue, m, n, a, lda, ipiv)
    }

    fn getri<T: RealScalar>(
        &self,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        scratch: u64,
        scratch_len: usize,
        deps: &[Event],
    ) -> Result<Event> {
        B::getri::<T>(self.queue, n, a, lda, ipiv, scratch, scratch_len, deps)
    }

    fn getri_buf<T: RealScalar>(
        &self,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
        ipiv: &Buffer<i64>,
        scratch: &Buffer<T>,
        scratch_len: usize,
    ) -> Result<()> {
        B::getri_buf(self.queue, n, a, lda, ipiv, scratch, scratch_len)
    }

    fn getri_scratchpad_size<T: RealScalar>(&self, n: usize, lda: usize) -> Result<usize> {
        Ok(B::getri_scratchpad_size::<T>(n, lda))
    }

    fn potrf<T: RealScalar>(
        &self,
        uplo: UpLo,
        n: usize,
        a: u64,
        lda: usize,
        deps: &[Event],
    ) -> Result<Event> {
        B::potrf::<T>(self.queue, uplo, n, a, lda, deps)
    }

    fn potrf_buf<T: RealScalar>(
        &self,
        uplo: UpLo,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
    ) -> Result<()> {
        B::potrf_buf(self.queue, uplo, n, a, lda)
    }
}

impl<B: CtRng> RngDispatch for Static<'_, B> {
    fn queue(&self) -> &Queue {
        self.queue
    }

    fn uniform<T: RealScalar>(
        &self,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event> {
        B::uniform::<T>(self.queue, engine, a, b, n, out, deps)
    }

    fn uniform_buf<T: RealScalar>(
        &self,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()> {
        B::uniform_buf(self.queue, engine, a, b, n, out)
    }

    fn gaussian<T: RealScalar>(
        &self,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event> {
        B::gaussian::<T>(self.queue, engine, mean, stddev, n, out, deps)
    }

    fn gaussian_buf<T: RealScalar>(
        &self,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()> {
        B::gaussian_buf(self.queue, engine, mean, stddev, n, out)
    }
}

impl<B: CtDft> DftDispatch for Static<'_, B> {
    fn queue(&self) -> &Queue {
        self.queue
    }

    fn probe(&self) -> Result<()> {
        // backend resolved at build time; nothing to probe
        Ok(())
    }

    fn forward<T: ComplexScalar>(&self, n: usize, inout: u64, deps: &[Event]) -> Result<Event> {
        B::forward::<T>(self.queue, n, inout, deps)
    }

    fn forward_buf<T: ComplexScalar>(&self, n: usize, inout: &Buffer<T>) -> Result<()> {
        B::forward_buf(self.queue, n, inout)
    }

    fn backward<T: ComplexScalar>(&self, n: usize, inout: u64, deps: &[Event]) -> Result<Event> {
        B::backward::<T>(self.queue, n, inout, deps)
    }

    fn backward_buf<T: ComplexScalar>(&self, n: usize, inout: &Buffer<T>) -> Result<()> {
        B::backward_buf(self.queue, n, inout)
    }
}

impl<B: CtSparse> SparseDispatch for Static<'_, B> {
    fn queue(&self) -> &Queue {
        self.queue
    }

    fn spmv<T: RealScalar>(
        &self,
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
        B::spmv(
            self.queue, trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta, y, deps,
        )
    }

    fn spmv_buf<T: RealScalar>(
        &self,
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
        B::spmv_buf(
            self.queue, trans, nrows, ncols, alpha, row_ptr, col_ind, values, x, beta, y,
        )
    }
}
