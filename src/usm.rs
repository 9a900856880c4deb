//! Explicit-pointer (unified shared memory) allocation helpers
//!
//! Device-accessible memory is addressed by `u64` handles throughout the
//! crate, so pointers can cross thread and table boundaries without
//! `Send` gymnastics. On the host device a handle is just the address of
//! a 64-byte-aligned heap block; the CUDA backend maps handles onto
//! device pointers from the driver allocator.
//!
//! Scratch/workspace memory for operations that need it is allocated
//! here *by the caller* and passed in; the core never allocates device
//! memory on a caller's behalf.

use crate::backend::{identify, Backend};
use crate::error::{Error, Result};
use crate::queue::Queue;
use crate::types::Domain;
use bytemuck::Pod;
use std::alloc::{alloc_zeroed, dealloc, Layout as AllocLayout};

// SIMD-friendly alignment for host blocks, matching what vendor CPU
// libraries assume.
const HOST_ALIGN: usize = 64;

fn is_host(queue: &Queue) -> bool {
    identify(queue.device(), Domain::Blas) == Backend::CpuNative
}

/// Allocate `len` elements of `T` accessible to the queue's device.
///
/// Returns 0 for zero-length requests; freeing 0 is a no-op.
pub fn malloc<T: Pod>(queue: &Queue, len: usize) -> Result<u64> {
    let size_bytes = len * std::mem::size_of::<T>();
    if size_bytes == 0 {
        return Ok(0);
    }

    if is_host(queue) {
        let layout = AllocLayout::from_size_align(size_bytes, HOST_ALIGN)
            .map_err(|e| Error::invalid_arg("len", e.to_string()))?;
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(Error::execution(format!(
                "host allocation of {} bytes failed",
                size_bytes
            )));
        }
        return Ok(ptr as u64);
    }

    #[cfg(feature = "cuda")]
    {
        return crate::backends::cuda::usm_alloc(queue, size_bytes);
    }

    #[cfg(not(feature = "cuda"))]
    {
        Err(Error::unsupported(
            Domain::Blas,
            format!(
                "no memory provider for device '{}'",
                queue.device().platform()
            ),
        ))
    }
}

/// Release a handle previously returned by [`malloc`] with the same `len`.
pub fn free<T: Pod>(queue: &Queue, ptr: u64, len: usize) {
    let size_bytes = len * std::mem::size_of::<T>();
    if ptr == 0 || size_bytes == 0 {
        return;
    }

    if is_host(queue) {
        // Alignment/size must match the allocation; both are derived the
        // same way, so this cannot fail after a successful malloc.
        let layout = AllocLayout::from_size_align(size_bytes, HOST_ALIGN)
            .expect("layout valid for allocated block");
        unsafe {
            dealloc(ptr as *mut u8, layout);
        }
        return;
    }

    #[cfg(feature = "cuda")]
    crate::backends::cuda::usm_free(queue, ptr);
}

/// Copy host data into a device handle. Synchronous.
pub fn copy_to_device<T: Pod>(queue: &Queue, src: &[T], dst: u64) -> Result<()> {
    if src.is_empty() || dst == 0 {
        return Ok(());
    }

    if is_host(queue) {
        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut T, src.len());
        }
        return Ok(());
    }

    #[cfg(feature = "cuda")]
    {
        return crate::backends::cuda::usm_copy_in(queue, bytemuck::cast_slice(src), dst);
    }

    #[cfg(not(feature = "cuda"))]
    {
        Err(Error::unsupported(
            Domain::Blas,
            format!(
                "no memory provider for device '{}'",
                queue.device().platform()
            ),
        ))
    }
}

/// Copy device data back to the host. Synchronous; callers order it
/// after outstanding work by waiting the relevant events first.
pub fn copy_from_device<T: Pod>(queue: &Queue, src: u64, dst: &mut [T]) -> Result<()> {
    if dst.is_empty() || src == 0 {
        return Ok(());
    }

    if is_host(queue) {
        unsafe {
            std::ptr::copy_nonoverlapping(src as *const T, dst.as_mut_ptr(), dst.len());
        }
        return Ok(());
    }

    #[cfg(feature = "cuda")]
    {
        return crate::backends::cuda::usm_copy_out(queue, src, bytemuck::cast_slice_mut(dst));
    }

    #[cfg(not(feature = "cuda"))]
    {
        Err(Error::unsupported(
            Domain::Blas,
            format!(
                "no memory provider for device '{}'",
                queue.device().platform()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Device;

    #[test]
    fn test_roundtrip() {
        let device = Device::cpu();
        let queue = Queue::new(&device);
        let data = [1.0f64, 2.0, 3.0, 4.0];

        let ptr = malloc::<f64>(&queue, 4).unwrap();
        copy_to_device(&queue, &data, ptr).unwrap();

        let mut out = [0.0f64; 4];
        copy_from_device(&queue, ptr, &mut out).unwrap();
        assert_eq!(out, data);

        free::<f64>(&queue, ptr, 4);
    }

    #[test]
    fn test_zero_len() {
        let device = Device::cpu();
        let queue = Queue::new(&device);
        let ptr = malloc::<f32>(&queue, 0).unwrap();
        assert_eq!(ptr, 0);
        free::<f32>(&queue, ptr, 0);
    }
}
