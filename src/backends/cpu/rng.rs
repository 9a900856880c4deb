//! CPU random generation kernels and table
//!
//! Samples inside the host task, holding the engine lock for the whole
//! fill so one generate consumes a contiguous run of the engine stream.
//! Uniform draws are width-matched (one raw word per f32, two per f64)
//! to keep `skip_ahead` partitions aligned; Gaussian sampling goes
//! through `rand_distr` and consumes a data-dependent number of words.

use super::CpuNative;
use crate::buffer::RawBuf;
use crate::dispatch::tables::{RngBufFn, RngTable, RngUsmFn, ABI_VERSION};
use crate::error::Result;
use crate::event::Event;
use crate::exec::{enqueue, enqueue_buffers};
use crate::queue::Queue;
use crate::rng::Engine;
use crate::scalar::RealScalar;
use crate::select::CtRng;
use crate::types::DataType;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Distribution, StandardNormal};

fn from_f64<T: RealScalar>(v: f64) -> T {
    T::from(v).expect("f64 converts to every real scalar")
}

/// Width-matched standard uniform draw.
fn draw01<T: RealScalar>(rng: &mut ChaCha12Rng) -> T {
    match T::DTYPE {
        DataType::F32 => from_f64(rng.random::<f32>() as f64),
        _ => from_f64(rng.random::<f64>()),
    }
}

fn fill_uniform<T: RealScalar>(rng: &mut ChaCha12Rng, a: f64, b: f64, n: usize, out: u64) {
    let p = out as *mut T;
    let lo = from_f64::<T>(a);
    let span = from_f64::<T>(b - a);
    for i in 0..n {
        let u: T = draw01(rng);
        unsafe {
            *p.add(i) = lo + span * u;
        }
    }
}

fn fill_gaussian<T: RealScalar>(rng: &mut ChaCha12Rng, mean: f64, stddev: f64, n: usize, out: u64) {
    let p = out as *mut T;
    for i in 0..n {
        let v: f64 = StandardNormal.sample(rng);
        unsafe {
            *p.add(i) = from_f64::<T>(mean + stddev * v);
        }
    }
}

// ============================================================================
// Typed entry points
// ============================================================================

pub(crate) fn uniform<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    a: f64,
    b: f64,
    n: usize,
    out: u64,
    deps: &[Event],
) -> Result<Event> {
    let state = engine.shared();
    Ok(enqueue(queue, deps, move || {
        let mut rng = state.lock().unwrap_or_else(|e| e.into_inner());
        fill_uniform::<T>(&mut rng, a, b, n, out);
        Ok(())
    }))
}

pub(crate) fn uniform_buf<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    a: f64,
    b: f64,
    n: usize,
    out: RawBuf<'_>,
) -> Result<()> {
    let state = engine.shared();
    let p = out.ptr;
    enqueue_buffers(queue, &[], &[out], move || {
        let mut rng = state.lock().unwrap_or_else(|e| e.into_inner());
        fill_uniform::<T>(&mut rng, a, b, n, p);
        Ok(())
    });
    Ok(())
}

pub(crate) fn gaussian<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    mean: f64,
    stddev: f64,
    n: usize,
    out: u64,
    deps: &[Event],
) -> Result<Event> {
    let state = engine.shared();
    Ok(enqueue(queue, deps, move || {
        let mut rng = state.lock().unwrap_or_else(|e| e.into_inner());
        fill_gaussian::<T>(&mut rng, mean, stddev, n, out);
        Ok(())
    }))
}

pub(crate) fn gaussian_buf<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    mean: f64,
    stddev: f64,
    n: usize,
    out: RawBuf<'_>,
) -> Result<()> {
    let state = engine.shared();
    let p = out.ptr;
    enqueue_buffers(queue, &[], &[out], move || {
        let mut rng = state.lock().unwrap_or_else(|e| e.into_inner());
        fill_gaussian::<T>(&mut rng, mean, stddev, n, p);
        Ok(())
    });
    Ok(())
}

// ============================================================================
// Erased table entries
// ============================================================================

fn uniform_usm_erased<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    a: f64,
    b: f64,
    n: usize,
    out: u64,
    deps: &[Event],
) -> Result<Event> {
    uniform::<T>(queue, engine, a, b, n, out, deps)
}

fn uniform_buf_erased<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    a: f64,
    b: f64,
    n: usize,
    out: RawBuf<'_>,
) -> Result<()> {
    uniform_buf::<T>(queue, engine, a, b, n, out)
}

fn gaussian_usm_erased<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    mean: f64,
    stddev: f64,
    n: usize,
    out: u64,
    deps: &[Event],
) -> Result<Event> {
    gaussian::<T>(queue, engine, mean, stddev, n, out, deps)
}

fn gaussian_buf_erased<T: RealScalar>(
    queue: &Queue,
    engine: &Engine,
    mean: f64,
    stddev: f64,
    n: usize,
    out: RawBuf<'_>,
) -> Result<()> {
    gaussian_buf::<T>(queue, engine, mean, stddev, n, out)
}

use super::real_types;

pub(crate) static TABLE: RngTable = RngTable {
    abi: ABI_VERSION,
    uniform: real_types!(uniform_usm_erased, RngUsmFn),
    uniform_buf: real_types!(uniform_buf_erased, RngBufFn),
    gaussian: real_types!(gaussian_usm_erased, RngUsmFn),
    gaussian_buf: real_types!(gaussian_buf_erased, RngBufFn),
};

// ============================================================================
// Compile-time entry points
// ============================================================================

impl CtRng for CpuNative {
    fn uniform<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event> {
        uniform::<T>(queue, engine, a, b, n, out, deps)
    }

    fn uniform_buf<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        a: f64,
        b: f64,
        n: usize,
        out: &crate::buffer::Buffer<T>,
    ) -> Result<()> {
        uniform_buf::<T>(queue, engine, a, b, n, out.raw())
    }

    fn gaussian<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: u64,
        deps: &[Event],
    ) -> Result<Event> {
        gaussian::<T>(queue, engine, mean, stddev, n, out, deps)
    }

    fn gaussian_buf<T: RealScalar>(
        queue: &Queue,
        engine: &Engine,
        mean: f64,
        stddev: f64,
        n: usize,
        out: &crate::buffer::Buffer<T>,
    ) -> Result<()> {
        gaussian_buf::<T>(queue, engine, mean, stddev, n, out.raw())
    }
}
