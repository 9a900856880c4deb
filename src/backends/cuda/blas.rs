//! cuBLAS-backed table entries
//!
//! Each entry submits a host task that binds the cached context, issues
//! the cuBLAS call on the cached stream, synchronizes the stream, and
//! reports the native status through the completion event.

use super::exec_for;
use crate::dispatch::tables::{BlasTable, GemmUsmFn, AxpyUsmFn, DotUsmFn, ABI_VERSION};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::exec::enqueue;
use crate::queue::Queue;
use crate::types::Transpose;
use cudarc::cublas::sys as cublas_sys;

fn op_to_cublas(t: Transpose) -> cublas_sys::cublasOperation_t {
    match t {
        Transpose::NoTrans => cublas_sys::cublasOperation_t::CUBLAS_OP_N,
        Transpose::Trans => cublas_sys::cublasOperation_t::CUBLAS_OP_T,
        Transpose::ConjTrans => cublas_sys::cublasOperation_t::CUBLAS_OP_C,
    }
}

fn check_status(op: &'static str, status: cublas_sys::cublasStatus_t) -> Result<()> {
    if status != cublas_sys::cublasStatus_t::CUBLAS_STATUS_SUCCESS {
        return Err(Error::execution(format!("{}: {:?}", op, status)));
    }
    Ok(())
}

macro_rules! cuda_gemm_entry {
    ($name:ident, $float:ty, $gemm:ident) => {
        #[allow(clippy::too_many_arguments)]
        fn $name(
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
            let exec = exec_for(queue)?;
            let alpha = unsafe { *(alpha as *const $float) };
            let beta = unsafe { *(beta as *const $float) };
            Ok(enqueue(queue, deps, move || {
                exec.context
                    .bind_to_thread()
                    .map_err(|e| Error::execution(format!("cuda bind_to_thread failed: {:?}", e)))?;
                let status = unsafe {
                    cublas_sys::$gemm(
                        *exec.cublas.handle(),
                        op_to_cublas(ta),
                        op_to_cublas(tb),
                        m as i32,
                        n as i32,
                        k as i32,
                        &alpha,
                        a as *const $float,
                        lda as i32,
                        b as *const $float,
                        ldb as i32,
                        &beta,
                        c as *mut $float,
                        ldc as i32,
                    )
                };
                check_status(stringify!($gemm), status)?;
                exec.stream
                    .synchronize()
                    .map_err(|e| Error::execution(format!("cuda stream sync failed: {:?}", e)))
            }))
        }
    };
}

cuda_gemm_entry!(gemm_f32, f32, cublasSgemm_v2);
cuda_gemm_entry!(gemm_f64, f64, cublasDgemm_v2);

macro_rules! cuda_axpy_entry {
    ($name:ident, $float:ty, $axpy:ident) => {
        #[allow(clippy::too_many_arguments)]
        fn $name(
            queue: &Queue,
            n: usize,
            alpha: *const u8,
            x: u64,
            incx: usize,
            y: u64,
            incy: usize,
            deps: &[Event],
        ) -> Result<Event> {
            let exec = exec_for(queue)?;
            let alpha = unsafe { *(alpha as *const $float) };
            Ok(enqueue(queue, deps, move || {
                exec.context
                    .bind_to_thread()
                    .map_err(|e| Error::execution(format!("cuda bind_to_thread failed: {:?}", e)))?;
                let status = unsafe {
                    cublas_sys::$axpy(
                        *exec.cublas.handle(),
                        n as i32,
                        &alpha,
                        x as *const $float,
                        incx as i32,
                        y as *mut $float,
                        incy as i32,
                    )
                };
                check_status(stringify!($axpy), status)?;
                exec.stream
                    .synchronize()
                    .map_err(|e| Error::execution(format!("cuda stream sync failed: {:?}", e)))
            }))
        }
    };
}

cuda_axpy_entry!(axpy_f32, f32, cublasSaxpy_v2);
cuda_axpy_entry!(axpy_f64, f64, cublasDaxpy_v2);

macro_rules! cuda_dot_entry {
    ($name:ident, $float:ty, $dot:ident) => {
        #[allow(clippy::too_many_arguments)]
        fn $name(
            queue: &Queue,
            n: usize,
            x: u64,
            incx: usize,
            y: u64,
            incy: usize,
            result: u64,
            deps: &[Event],
        ) -> Result<Event> {
            let exec = exec_for(queue)?;
            Ok(enqueue(queue, deps, move || {
                exec.context
                    .bind_to_thread()
                    .map_err(|e| Error::execution(format!("cuda bind_to_thread failed: {:?}", e)))?;
                let status = unsafe {
                    cublas_sys::$dot(
                        *exec.cublas.handle(),
                        n as i32,
                        x as *const $float,
                        incx as i32,
                        y as *const $float,
                        incy as i32,
                        result as *mut $float,
                    )
                };
                check_status(stringify!($dot), status)?;
                exec.stream
                    .synchronize()
                    .map_err(|e| Error::execution(format!("cuda stream sync failed: {:?}", e)))
            }))
        }
    };
}

cuda_dot_entry!(dot_f32, f32, cublasSdot_v2);
cuda_dot_entry!(dot_f64, f64, cublasDdot_v2);

static TABLE: BlasTable = BlasTable {
    abi: ABI_VERSION,
    gemm: [
        Some(gemm_f32 as GemmUsmFn),
        Some(gemm_f64 as GemmUsmFn),
        None,
        None,
    ],
    gemm_buf: [None, None, None, None],
    gemv: [None, None, None, None],
    gemv_buf: [None, None, None, None],
    syrk: [None, None, None, None],
    syrk_buf: [None, None, None, None],
    axpy: [
        Some(axpy_f32 as AxpyUsmFn),
        Some(axpy_f64 as AxpyUsmFn),
        None,
        None,
    ],
    axpy_buf: [None, None, None, None],
    dot: [
        Some(dot_f32 as DotUsmFn),
        Some(dot_f64 as DotUsmFn),
        None,
        None,
    ],
    dot_buf: [None, None, None, None],
};

/// The cuBLAS-backed table handed to the registry.
pub(crate) fn blas_table() -> &'static BlasTable {
    &TABLE
}
