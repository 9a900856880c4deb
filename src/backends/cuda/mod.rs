//! CUDA backend
//!
//! Runtime-only provider: it fills a partial BLAS table (gemm/axpy/dot
//! for f32/f64, explicit-pointer model) through cuBLAS; every other
//! entry stays `None` and surfaces `UnimplementedOperation`, which is
//! exactly how a heterogeneous deployment probes what this unit covers.
//!
//! # Thread Safety
//!
//! One context/stream/handle triple is cached per device ordinal. Host
//! tasks bind the context to their thread before touching the driver.
//! All work launches on the cached stream; the submitted host task
//! synchronizes that stream and then signals the abstract event, which
//! is the one-time wrap from the native completion primitive onto the
//! crate-wide signal type.

pub(crate) mod blas;

use crate::error::{Error, Result};
use crate::queue::Queue;
use cudarc::cublas::CudaBlas;
use cudarc::driver::safe::{CudaContext, CudaStream};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

pub(crate) use blas::blas_table;

/// Cached per-device execution state.
#[derive(Clone)]
pub(crate) struct CudaExec {
    pub(crate) context: Arc<CudaContext>,
    pub(crate) stream: Arc<CudaStream>,
    pub(crate) cublas: Arc<CudaBlas>,
}

static EXEC_CACHE: OnceLock<Mutex<HashMap<usize, CudaExec>>> = OnceLock::new();

fn lock_cache(
    cache: &Mutex<HashMap<usize, CudaExec>>,
) -> MutexGuard<'_, HashMap<usize, CudaExec>> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Get or create the execution state for a device ordinal.
pub(crate) fn exec_for(queue: &Queue) -> Result<CudaExec> {
    let ordinal = queue.device().index();
    let cache = EXEC_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = lock_cache(cache);

    if let Some(exec) = guard.get(&ordinal) {
        return Ok(exec.clone());
    }

    let context = CudaContext::new(ordinal)
        .map_err(|e| Error::execution(format!("cuda context creation failed: {:?}", e)))?;
    let stream = context.default_stream();
    let cublas = Arc::new(
        CudaBlas::new(stream.clone())
            .map_err(|e| Error::execution(format!("cublas handle creation failed: {:?}", e)))?,
    );
    let exec = CudaExec {
        context,
        stream,
        cublas,
    };
    guard.insert(ordinal, exec.clone());
    Ok(exec)
}

#[cold]
#[inline(never)]
fn log_driver_error(operation: &str, result: cudarc::driver::sys::CUresult) {
    eprintln!("[unimath::cuda] {} failed: {:?}", operation, result);
}

/// Allocate device memory on the queue's device.
pub(crate) fn usm_alloc(queue: &Queue, size_bytes: usize) -> Result<u64> {
    let exec = exec_for(queue)?;
    exec.context
        .bind_to_thread()
        .map_err(|e| Error::execution(format!("cuda bind_to_thread failed: {:?}", e)))?;
    unsafe {
        let mut ptr: u64 = 0;
        let result = cudarc::driver::sys::cuMemAllocAsync(
            &mut ptr,
            size_bytes,
            exec.stream.cu_stream(),
        );
        if result != cudarc::driver::sys::CUresult::CUDA_SUCCESS {
            log_driver_error("cuMemAllocAsync", result);
            return Err(Error::execution(format!(
                "cuda allocation of {} bytes failed: {:?}",
                size_bytes, result
            )));
        }
        Ok(ptr)
    }
}

/// Free device memory allocated by [`usm_alloc`].
pub(crate) fn usm_free(queue: &Queue, ptr: u64) {
    let Ok(exec) = exec_for(queue) else {
        return;
    };
    if exec.context.bind_to_thread().is_err() {
        return;
    }
    unsafe {
        let result = cudarc::driver::sys::cuMemFreeAsync(ptr, exec.stream.cu_stream());
        if result != cudarc::driver::sys::CUresult::CUDA_SUCCESS {
            log_driver_error("cuMemFreeAsync", result);
        }
    }
}

/// Synchronous host-to-device copy.
pub(crate) fn usm_copy_in(queue: &Queue, src: &[u8], dst: u64) -> Result<()> {
    let exec = exec_for(queue)?;
    exec.context
        .bind_to_thread()
        .map_err(|e| Error::execution(format!("cuda bind_to_thread failed: {:?}", e)))?;
    unsafe {
        let result = cudarc::driver::sys::cuMemcpyHtoD_v2(
            dst,
            src.as_ptr() as *const std::ffi::c_void,
            src.len(),
        );
        if result != cudarc::driver::sys::CUresult::CUDA_SUCCESS {
            log_driver_error("cuMemcpyHtoD", result);
            return Err(Error::execution(format!("cuda copy-in failed: {:?}", result)));
        }
    }
    Ok(())
}

/// Synchronous device-to-host copy.
pub(crate) fn usm_copy_out(queue: &Queue, src: u64, dst: &mut [u8]) -> Result<()> {
    let exec = exec_for(queue)?;
    exec.context
        .bind_to_thread()
        .map_err(|e| Error::execution(format!("cuda bind_to_thread failed: {:?}", e)))?;
    unsafe {
        let result = cudarc::driver::sys::cuMemcpyDtoH_v2(
            dst.as_mut_ptr() as *mut std::ffi::c_void,
            src,
            dst.len(),
        );
        if result != cudarc::driver::sys::CUresult::CUDA_SUCCESS {
            log_driver_error("cuMemcpyDtoH", result);
            return Err(Error::execution(format!("cuda copy-out failed: {:?}", result)));
        }
    }
    Ok(())
}
