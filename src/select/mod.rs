//! Backend selection strategies
//!
//! Two independent, swappable strategies sit behind one facade
//! signature: every domain facade is generic over a per-domain dispatch
//! trait, and the caller picks the strategy by choosing the selector
//! value it passes in.
//!
//! - [`Static<B>`] binds the call site to one concrete backend at build
//!   time. Resolution is monomorphization; there is no branch, no table,
//!   and an operation (or scalar family) the backend does not provide is
//!   a build-time failure because the trait impl or bound does not exist.
//! - [`Dynamic`] inspects the queue's device at run time, loads the
//!   matching function table once, and calls through its entry. This
//!   path can mix heterogeneous backends in one process and select
//!   backends without recompilation, at the cost of one identification
//!   and one table lookup per call.
//!
//! The dispatch traits receive arguments already normalized to the
//! backends' column-major native convention; layout adaptation happens
//! in the facades before selection.

mod compile_time;
mod runtime;

pub use compile_time::{
    CtBlas, CtDft, CtLapack, CtRng, CtSparse, NativeBackend, Static,
};
pub use runtime::Dynamic;

use crate::buffer::Buffer;
use crate::error::Result;
use crate::event::Event;
use crate::queue::Queue;
use crate::rng::Engine;
use crate::scalar::{ComplexScalar, RealScalar, Scalar};
use crate::types::{Transpose, UpLo};

/// Dense level 1-3 dispatch, column-major native convention.
#[allow(clippy::too_many_arguments)]
pub trait BlasDispatch {
    /// Queue the strategy submits against.
    fn queue(&self) -> &Queue;

    /// General matrix multiply, explicit-pointer model.
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
    ) -> Result<Event>;

    /// General matrix multiply, managed-buffer model.
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
    ) -> Result<()>;

    /// General matrix-vector multiply, explicit-pointer model.
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
    ) -> Result<Event>;

    /// General matrix-vector multiply, managed-buffer model.
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
    ) -> Result<()>;

    /// Symmetric rank-k update, explicit-pointer model.
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
    ) -> Result<Event>;

    /// Symmetric rank-k update, managed-buffer model.
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
    ) -> Result<()>;

    /// `y := alpha*x + y`, explicit-pointer model.
    fn axpy<T: Scalar>(
        &self,
        n: usize,
        alpha: T,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        deps: &[Event],
    ) -> Result<Event>;

    /// `y := alpha*x + y`, managed-buffer model.
    fn axpy_buf<T: Scalar>(
        &self,
        n: usize,
        alpha: T,
        x: &Buffer<T>,
        incx: usize,
        y: &Buffer<T>,
        incy: usize,
    ) -> Result<()>;

    /// Unconjugated dot product written to a one-element result handle.
    fn dot<T: Scalar>(
        &self,
        n: usize,
        x: u64,
        incx: usize,
        y: u64,
        incy: usize,
        result: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// Unconjugated dot product, managed-buffer model.
    fn dot_buf<T: Scalar>(
        &self,
        n: usize,
        x: &Buffer<T>,
        incx: usize,
        y: &Buffer<T>,
        incy: usize,
        result: &Buffer<T>,
    ) -> Result<()>;
}

/// Dense factorization dispatch, column-major native convention.
#[allow(clippy::too_many_arguments)]
pub trait LapackDispatch {
    /// Queue the strategy submits against.
    fn queue(&self) -> &Queue;

    /// LU factorization with partial pivoting, in place.
    fn getrf<T: RealScalar>(
        &self,
        m: usize,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// LU factorization, managed-buffer model.
    fn getrf_buf<T: RealScalar>(
        &self,
        m: usize,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
        ipiv: &Buffer<i64>,
    ) -> Result<()>;

    /// Inverse from an LU factorization, in place, caller-allocated scratch.
    fn getri<T: RealScalar>(
        &self,
        n: usize,
        a: u64,
        lda: usize,
        ipiv: u64,
        scratch: u64,
        scratch_len: usize,
        deps: &[Event],
    ) -> Result<Event>;

    /// Inverse from an LU factorization, managed-buffer model.
    fn getri_buf<T: RealScalar>(
        &self,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
        ipiv: &Buffer<i64>,
        scratch: &Buffer<T>,
        scratch_len: usize,
    ) -> Result<()>;

    /// Scratch element count `getri` requires for these arguments.
    fn getri_scratchpad_size<T: RealScalar>(&self, n: usize, lda: usize) -> Result<usize>;

    /// Cholesky factorization, in place.
    fn potrf<T: RealScalar>(
        &self,
        uplo: UpLo,
        n: usize,
        a: u64,
        lda: usize,
        deps: &[Event],
    ) -> Result<Event>;

    /// Cholesky factorization, managed-buffer model.
    fn potrf_buf<T: RealScalar>(
        &self,
        uplo: UpLo,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
    ) -> Result<()>;
}

/// Random generation dispatch.
#[allow(clippy::too_many_arguments)]
pub trait RngDispatch {
    /// Queue the strategy submits against.
    fn queue(&self) -> &Queue;

    /// Fill `n` elements uniformly distributed on `[a, b)`.
    fn uniform<T: RealScalar>(
        &self,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// Uniform fill, managed-buffer model.
    fn uniform_buf<T: RealScalar>(
        &self,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()>;

    /// Fill `n` elements from a Gaussian distribution.
    fn gaussian<T: RealScalar>(
        &self,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// Gaussian fill, managed-buffer model.
    fn gaussian_buf<T: RealScalar>(
        &self,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()>;
}

/// Discrete Fourier transform dispatch, in-place complex transforms.
pub trait DftDispatch {
    /// Queue the strategy submits against.
    fn queue(&self) -> &Queue;

    /// Resolve the backend serving this strategy, failing now rather
    /// than at first compute. Used by descriptor commit.
    fn probe(&self) -> Result<()>;

    /// Forward transform, explicit-pointer model.
    fn forward<T: ComplexScalar>(&self, n: usize, inout: u64, deps: &[Event]) -> Result<Event>;

    /// Forward transform, managed-buffer model.
    fn forward_buf<T: ComplexScalar>(&self, n: usize, inout: &Buffer<T>) -> Result<()>;

    /// Backward transform (scaled by `1/n`), explicit-pointer model.
    fn backward<T: ComplexScalar>(&self, n: usize, inout: u64, deps: &[Event]) -> Result<Event>;

    /// Backward transform, managed-buffer model.
    fn backward_buf<T: ComplexScalar>(&self, n: usize, inout: &Buffer<T>) -> Result<()>;
}

/// Sparse matrix-vector dispatch, CSR native convention.
#[allow(clippy::too_many_arguments)]
pub trait SparseDispatch {
    /// Queue the strategy submits against.
    fn queue(&self) -> &Queue;

    /// `y := alpha*op(A)*x + beta*y` over CSR arrays.
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
    ) -> Result<Event>;

    /// Sparse matrix-vector multiply, managed-buffer model.
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
    ) -> Result<()>;
}

/// Sparse triangular-solve dispatch.
///
/// Declared by the table ABI but filled by no built backend; only the
/// runtime strategy can attempt it, and the attempt reports
/// `UnimplementedOperation`. A compile-time selector has no impl of this
/// trait, so the same call fails the build instead.
#[allow(clippy::too_many_arguments)]
pub trait SparseTriDispatch {
    /// Solve `op(T)*x = b` in place over CSR arrays.
    fn trsv<T: RealScalar>(
        &self,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        row_ptr: u64,
        col_ind: u64,
        values: u64,
        x: u64,
        deps: &[Event],
    ) -> Result<Event>;

    /// Triangular solve, managed-buffer model.
    fn trsv_buf<T: RealScalar>(
        &self,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        row_ptr: &Buffer<i64>,
        col_ind: &Buffer<i64>,
        values: &Buffer<T>,
        x: &Buffer<T>,
    ) -> Result<()>;
}
