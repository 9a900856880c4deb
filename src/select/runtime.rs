//! Runtime backend selection
//!
//! `Dynamic` resolves the backend from the queue's device on every call:
//! identify, fetch the (domain, backend) table, index the entry for the
//! operation and scalar type, invoke through the function pointer. The
//! identification and table fetch are both memoized process-wide, so the
//! steady-state cost is two hash lookups and an indirect call.

use super::{
    BlasDispatch, DftDispatch, LapackDispatch, RngDispatch, SparseDispatch, SparseTriDispatch,
};
use crate::backend::{identify, Backend};
use crate::buffer::Buffer;
use crate::dispatch::registry;
use crate::dispatch::tables::entry;
use crate::error::Result;
use crate::event::Event;
use crate::queue::Queue;
use crate::rng::Engine;
use crate::scalar::{ComplexScalar, RealScalar, Scalar};
use crate::types::{Domain, Transpose, UpLo};

/// Runtime-dispatch selector for one queue.
#[derive(Clone, Copy)]
pub struct Dynamic<'q> {
    queue: &'q Queue,
}

impl<'q> Dynamic<'q> {
    /// Create a runtime selector submitting on `queue`.
    pub fn new(queue: &'q Queue) -> Self {
        Self { queue }
    }

    fn backend(&self, domain: Domain) -> Backend {
        identify(self.queue.device(), domain)
    }
}

// Scalars cross the erased entry boundary as byte pointers, read back
// synchronously inside the shim before any submission.
#[inline]
fn erased<T: Scalar>(v: &T) -> *const u8 {
    v as *const T as *const u8
}

impl BlasDispatch for Dynamic<'_> {
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.gemm, T::DTYPE, backend, Domain::Blas, "gemm")?;
        f(
            self.queue,
            ta,
            tb,
            m,
            n,
            k,
            erased(&alpha),
            a,
            lda,
            b,
            ldb,
            erased(&beta),
            c,
            ldc,
            deps,
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.gemm_buf, T::DTYPE, backend, Domain::Blas, "gemm")?;
        f(
            self.queue,
            ta,
            tb,
            m,
            n,
            k,
            erased(&alpha),
            a.raw(),
            lda,
            b.raw(),
            ldb,
            erased(&beta),
            c.raw(),
            ldc,
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.gemv, T::DTYPE, backend, Domain::Blas, "gemv")?;
        f(
            self.queue,
            trans,
            m,
            n,
            erased(&alpha),
            a,
            lda,
            x,
            incx,
            erased(&beta),
            y,
            incy,
            deps,
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.gemv_buf, T::DTYPE, backend, Domain::Blas, "gemv")?;
        f(
            self.queue,
            trans,
            m,
            n,
            erased(&alpha),
            a.raw(),
            lda,
            x.raw(),
            incx,
            erased(&beta),
            y.raw(),
            incy,
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.syrk, T::DTYPE, backend, Domain::Blas, "syrk")?;
        f(
            self.queue,
            uplo,
            trans,
            n,
            k,
            erased(&alpha),
            a,
            lda,
            erased(&beta),
            c,
            ldc,
            deps,
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.syrk_buf, T::DTYPE, backend, Domain::Blas, "syrk")?;
        f(
            self.queue,
            uplo,
            trans,
            n,
            k,
            erased(&alpha),
            a.raw(),
            lda,
            erased(&beta),
            c.raw(),
            ldc,
        )
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.axpy, T::DTYPE, backend, Domain::Blas, "axpy")?;
        f(self.queue, n, erased(&alpha), x, incx, y, incy, deps)
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.axpy_buf, T::DTYPE, backend, Domain::Blas, "axpy")?;
        f(self.queue, n, erased(&alpha), x.raw(), incx, y.raw(), incy)
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.dot, T::DTYPE, backend, Domain::Blas, "dot")?;
        f(self.queue, n, x, incx, y, incy, result, deps)
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
        let backend = self.backend(Domain::Blas);
        let table = registry::blas_table(backend)?;
        let f = entry(&table.dot_buf, T::DTYPE, backend, Domain::Blas, "dot")?;
        f(self.queue, n, x.raw(), incx, y.raw(), incy, result.raw())
    }
}

impl LapackDispatch for Dynamic<'_> {
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
        let backend = self.backend(Domain::Lapack);
        let table = registry::lapack_table(backend)?;
        let f = entry(&table.getrf, T::DTYPE, backend, Domain::Lapack, "getrf")?;
        f(self.queue, m, n, a, lda, ipiv, deps)
    }

    fn getrf_buf<T: RealScalar>(
        &self,
        m: usize,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
        ipiv: &Buffer<i64>,
    ) -> Result<()> {
        let backend = self.backend(Domain::Lapack);
        let table = registry::lapack_table(backend)?;
        let f = entry(&table.getrf_buf, T::DTYPE, backend, Domain::Lapack, "getrf")?;
        f(self.queue, m, n, a.raw(), lda, ipiv.raw())
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
        let backend = self.backend(Domain::Lapack);
        let table = registry::lapack_table(backend)?;
        let f = entry(&table.getri, T::DTYPE, backend, Domain::Lapack, "getri")?;
        f(self.queue, n, a, lda, ipiv, scratch, scratch_len, deps)
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
        let backend = self.backend(Domain::Lapack);
        let table = registry::lapack_table(backend)?;
        let f = entry(&table.getri_buf, T::DTYPE, backend, Domain::Lapack, "getri")?;
        f(
            self.queue,
            n,
            a.raw(),
            lda,
            ipiv.raw(),
            scratch.raw(),
            scratch_len,
        )
    }

    fn getri_scratchpad_size<T: RealScalar>(&self, n: usize, lda: usize) -> Result<usize> {
        let backend = self.backend(Domain::Lapack);
        let table = registry::lapack_table(backend)?;
        let f = entry(
            &table.getri_scratchpad_size,
            T::DTYPE,
            backend,
            Domain::Lapack,
            "getri_scratchpad_size",
        )?;
        Ok(f(n, lda))
    }

    fn potrf<T: RealScalar>(
        &self,
        uplo: UpLo,
        n: usize,
        a: u64,
        lda: usize,
        deps: &[Event],
    ) -> Result<Event> {
        let backend = self.backend(Domain::Lapack);
        let table = registry::lapack_table(backend)?;
        let f = entry(&table.potrf, T::DTYPE, backend, Domain::Lapack, "potrf")?;
        f(self.queue, uplo, n, a, lda, deps)
    }

    fn potrf_buf<T: RealScalar>(
        &self,
        uplo: UpLo,
        n: usize,
        a: &Buffer<T>,
        lda: usize,
    ) -> Result<()> {
        let backend = self.backend(Domain::Lapack);
        let table = registry::lapack_table(backend)?;
        let f = entry(&table.potrf_buf, T::DTYPE, backend, Domain::Lapack, "potrf")?;
        f(self.queue, uplo, n, a.raw(), lda)
    }
}

impl RngDispatch for Dynamic<'_> {
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
        let backend = self.backend(Domain::Rng);
        let table = registry::rng_table(backend)?;
        let f = entry(&table.uniform, T::DTYPE, backend, Domain::Rng, "uniform")?;
        f(self.queue, engine, a, b, n, out, deps)
    }

    fn uniform_buf<T: RealScalar>(
        &self,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()> {
        let backend = self.backend(Domain::Rng);
        let table = registry::rng_table(backend)?;
        let f = entry(&table.uniform_buf, T::DTYPE, backend, Domain::Rng, "uniform")?;
        f(self.queue, engine, a, b, n, out.raw())
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
        let backend = self.backend(Domain::Rng);
        let table = registry::rng_table(backend)?;
        let f = entry(&table.gaussian, T::DTYPE, backend, Domain::Rng, "gaussian")?;
        f(self.queue, engine, mean, stddev, n, out, deps)
    }

    fn gaussian_buf<T: RealScalar>(
        &self,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: &Buffer<T>,
    ) -> Result<()> {
        let backend = self.backend(Domain::Rng);
        let table = registry::rng_table(backend)?;
        let f = entry(
            &table.gaussian_buf,
            T::DTYPE,
            backend,
            Domain::Rng,
            "gaussian",
        )?;
        f(self.queue, engine, mean, stddev, n, out.raw())
    }
}

impl DftDispatch for Dynamic<'_> {
    fn queue(&self) -> &Queue {
        self.queue
    }

    fn probe(&self) -> Result<()> {
        let backend = self.backend(Domain::Dft);
        registry::dft_table(backend).map(|_| ())
    }

    fn forward<T: ComplexScalar>(&self, n: usize, inout: u64, deps: &[Event]) -> Result<Event> {
        let backend = self.backend(Domain::Dft);
        let table = registry::dft_table(backend)?;
        let f = entry(&table.forward, T::DTYPE, backend, Domain::Dft, "forward")?;
        f(self.queue, n, inout, deps)
    }

    fn forward_buf<T: ComplexScalar>(&self, n: usize, inout: &Buffer<T>) -> Result<()> {
        let backend = self.backend(Domain::Dft);
        let table = registry::dft_table(backend)?;
        let f = entry(
            &table.forward_buf,
            T::DTYPE,
            backend,
            Domain::Dft,
            "forward",
        )?;
        f(self.queue, n, inout.raw())
    }

    fn backward<T: ComplexScalar>(&self, n: usize, inout: u64, deps: &[Event]) -> Result<Event> {
        let backend = self.backend(Domain::Dft);
        let table = registry::dft_table(backend)?;
        let f = entry(&table.backward, T::DTYPE, backend, Domain::Dft, "backward")?;
        f(self.queue, n, inout, deps)
    }

    fn backward_buf<T: ComplexScalar>(&self, n: usize, inout: &Buffer<T>) -> Result<()> {
        let backend = self.backend(Domain::Dft);
        let table = registry::dft_table(backend)?;
        let f = entry(
            &table.backward_buf,
            T::DTYPE,
            backend,
            Domain::Dft,
            "backward",
        )?;
        f(self.queue, n, inout.raw())
    }
}

impl SparseDispatch for Dynamic<'_> {
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
        let backend = self.backend(Domain::Sparse);
        let table = registry::sparse_table(backend)?;
        let f = entry(&table.spmv, T::DTYPE, backend, Domain::Sparse, "spmv")?;
        f(
            self.queue,
            trans,
            nrows,
            ncols,
            erased(&alpha),
            row_ptr,
            col_ind,
            values,
            x,
            erased(&beta),
            y,
            deps,
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
        let backend = self.backend(Domain::Sparse);
        let table = registry::sparse_table(backend)?;
        let f = entry(&table.spmv_buf, T::DTYPE, backend, Domain::Sparse, "spmv")?;
        f(
            self.queue,
            trans,
            nrows,
            ncols,
            erased(&alpha),
            row_ptr.raw(),
            col_ind.raw(),
            values.raw(),
            x.raw(),
            erased(&beta),
            y.raw(),
        )
    }
}

impl SparseTriDispatch for Dynamic<'_> {
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
    ) -> Result<Event> {
        let backend = self.backend(Domain::Sparse);
        let table = registry::sparse_table(backend)?;
        let f = entry(&table.trsv, T::DTYPE, backend, Domain::Sparse, "trsv")?;
        f(
            self.queue, uplo, trans, n, row_ptr, col_ind, values, x, deps,
        )
    }

    fn trsv_buf<T: RealScalar>(
        &self,
        uplo: UpLo,
        trans: Transpose,
        n: usize,
        row_ptr: &Buffer<i64>,
        col_ind: &Buffer<i64>,
        values: &Buffer<T>,
        x: &Buffer<T>,
    ) -> Result<()> {
        let backend = self.backend(Domain::Sparse);
        let table = registry::sparse_table(backend)?;
        let f = entry(&table.trsv_buf, T::DTYPE, backend, Domain::Sparse, "trsv")?;
        f(
            self.queue,
            uplo,
            trans,
            n,
            row_ptr.raw(),
            col_ind.raw(),
            values.raw(),
            x.raw(),
        )
    }
}
