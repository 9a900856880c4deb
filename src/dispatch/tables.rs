//! Per-domain function table layouts
//!
//! Every entry is an erased monomorphization: scalar parameters travel as
//! `*const u8` (read synchronously, before submission), operand memory as
//! `u64` device handles (explicit-pointer model) or [`RawBuf`] views
//! (managed-buffer model). Absent entries are `None`, which the selector
//! surfaces as `UnimplementedOperation` — distinct from a backend whose
//! table cannot be obtained at all.
//!
//! The `abi` field is the table shape version. It is validated before a
//! table's first use; a mismatch is a deployment error, never a silent
//! reinterpretation.

use crate::backend::Backend;
use crate::buffer::RawBuf;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::queue::Queue;
use crate::rng::Engine;
use crate::types::{DataType, Domain, Transpose, UpLo};

/// Table shape version shared by every domain.
pub(crate) const ABI_VERSION: u32 = 1;

/// One slot per scalar type, indexed by [`DataType::index`].
pub(crate) type PerType<F> = [Option<F>; DataType::COUNT];

/// Look up an entry, mapping absence to `UnimplementedOperation`.
pub(crate) fn entry<F: Copy>(
    slot: &PerType<F>,
    dtype: DataType,
    backend: Backend,
    domain: Domain,
    op: &'static str,
) -> Result<F> {
    slot[dtype.index()].ok_or_else(|| Error::unimplemented(backend, domain, op))
}

// ============================================================================
// BLAS
// ============================================================================

pub(crate) type GemmUsmFn = fn(
    &Queue,
    Transpose,
    Transpose,
    usize,
    usize,
    usize,
    *const u8,
    u64,
    usize,
    u64,
    usize,
    *const u8,
    u64,
    usize,
    &[Event],
) -> Result<Event>;

pub(crate) type GemmBufFn = fn(
    &Queue,
    Transpose,
    Transpose,
    usize,
    usize,
    usize,
    *const u8,
    RawBuf<'_>,
    usize,
    RawBuf<'_>,
    usize,
    *const u8,
    RawBuf<'_>,
    usize,
) -> Result<()>;

pub(crate) type GemvUsmFn = fn(
    &Queue,
    Transpose,
    usize,
    usize,
    *const u8,
    u64,
    usize,
    u64,
    usize,
    *const u8,
    u64,
    usize,
    &[Event],
) -> Result<Event>;

pub(crate) type GemvBufFn = fn(
    &Queue,
    Transpose,
    usize,
    usize,
    *const u8,
    RawBuf<'_>,
    usize,
    RawBuf<'_>,
    usize,
    *const u8,
    RawBuf<'_>,
    usize,
) -> Result<()>;

pub(crate) type SyrkUsmFn = fn(
    &Queue,
    UpLo,
    Transpose,
    usize,
    usize,
    *const u8,
    u64,
    usize,
    *const u8,
    u64,
    usize,
    &[Event],
) -> Result<Event>;

pub(crate) type SyrkBufFn = fn(
    &Queue,
    UpLo,
    Transpose,
    usize,
    usize,
    *const u8,
    RawBuf<'_>,
    usize,
    *const u8,
    RawBuf<'_>,
    usize,
) -> Result<()>;

pub(crate) type AxpyUsmFn =
    fn(&Queue, usize, *const u8, u64, usize, u64, usize, &[Event]) -> Result<Event>;

pub(crate) type AxpyBufFn =
    fn(&Queue, usize, *const u8, RawBuf<'_>, usize, RawBuf<'_>, usize) -> Result<()>;

pub(crate) type DotUsmFn =
    fn(&Queue, usize, u64, usize, u64, usize, u64, &[Event]) -> Result<Event>;

pub(crate) type DotBufFn =
    fn(&Queue, usize, RawBuf<'_>, usize, RawBuf<'_>, usize, RawBuf<'_>) -> Result<()>;

/// Dense level 1-3 entry points for one backend.
pub(crate) struct BlasTable {
    pub abi: u32,
    pub gemm: PerType<GemmUsmFn>,
    pub gemm_buf: PerType<GemmBufFn>,
    pub gemv: PerType<GemvUsmFn>,
    pub gemv_buf: PerType<GemvBufFn>,
    pub syrk: PerType<SyrkUsmFn>,
    pub syrk_buf: PerType<SyrkBufFn>,
    pub axpy: PerType<AxpyUsmFn>,
    pub axpy_buf: PerType<AxpyBufFn>,
    pub dot: PerType<DotUsmFn>,
    pub dot_buf: PerType<DotBufFn>,
}

// ============================================================================
// LAPACK
// ============================================================================

pub(crate) type GetrfUsmFn =
    fn(&Queue, usize, usize, u64, usize, u64, &[Event]) -> Result<Event>;

pub(crate) type GetrfBufFn =
    fn(&Queue, usize, usize, RawBuf<'_>, usize, RawBuf<'_>) -> Result<()>;

pub(crate) type GetriUsmFn =
    fn(&Queue, usize, u64, usize, u64, u64, usize, &[Event]) -> Result<Event>;

pub(crate) type GetriBufFn =
    fn(&Queue, usize, RawBuf<'_>, usize, RawBuf<'_>, RawBuf<'_>, usize) -> Result<()>;

/// Scratchpad sizing query: `(n, lda) -> elements`. Synchronous.
pub(crate) type GetriScratchFn = fn(usize, usize) -> usize;

pub(crate) type PotrfUsmFn = fn(&Queue, UpLo, usize, u64, usize, &[Event]) -> Result<Event>;

pub(crate) type PotrfBufFn = fn(&Queue, UpLo, usize, RawBuf<'_>, usize) -> Result<()>;

/// Dense factorization entry points for one backend. Column-major only.
pub(crate) struct LapackTable {
    pub abi: u32,
    pub getrf: PerType<GetrfUsmFn>,
    pub getrf_buf: PerType<GetrfBufFn>,
    pub getri: PerType<GetriUsmFn>,
    pub getri_buf: PerType<GetriBufFn>,
    pub getri_scratchpad_size: PerType<GetriScratchFn>,
    pub potrf: PerType<PotrfUsmFn>,
    pub potrf_buf: PerType<PotrfBufFn>,
}

// ============================================================================
// RNG
// ============================================================================

pub(crate) type RngUsmFn = fn(&Queue, &Engine, f64, f64, usize, u64, &[Event]) -> Result<Event>;

pub(crate) type RngBufFn = fn(&Queue, &Engine, f64, f64, usize, RawBuf<'_>) -> Result<()>;

/// Random generation entry points for one backend. Distribution
/// parameters travel as two f64s (lower/upper or mean/stddev).
pub(crate) struct RngTable {
    pub abi: u32,
    pub uniform: PerType<RngUsmFn>,
    pub uniform_buf: PerType<RngBufFn>,
    pub gaussian: PerType<RngUsmFn>,
    pub gaussian_buf: PerType<RngBufFn>,
}

// ============================================================================
// DFT
// ============================================================================

pub(crate) type DftUsmFn = fn(&Queue, usize, u64, &[Event]) -> Result<Event>;

pub(crate) type DftBufFn = fn(&Queue, usize, RawBuf<'_>) -> Result<()>;

/// In-place complex transform entry points for one backend.
pub(crate) struct DftTable {
    pub abi: u32,
    pub forward: PerType<DftUsmFn>,
    pub forward_buf: PerType<DftBufFn>,
    pub backward: PerType<DftUsmFn>,
    pub backward_buf: PerType<DftBufFn>,
}

// ============================================================================
// Sparse
// ============================================================================

pub(crate) type SpmvUsmFn = fn(
    &Queue,
    Transpose,
    usize,
    usize,
    *const u8,
    u64,
    u64,
    u64,
    u64,
    *const u8,
    u64,
    &[Event],
) -> Result<Event>;

pub(crate) type SpmvBufFn = fn(
    &Queue,
    Transpose,
    usize,
    usize,
    *const u8,
    RawBuf<'_>,
    RawBuf<'_>,
    RawBuf<'_>,
    RawBuf<'_>,
    *const u8,
    RawBuf<'_>,
) -> Result<()>;

pub(crate) type TrsvUsmFn =
    fn(&Queue, UpLo, Transpose, usize, u64, u64, u64, u64, &[Event]) -> Result<Event>;

pub(crate) type TrsvBufFn = fn(
    &Queue,
    UpLo,
    Transpose,
    usize,
    RawBuf<'_>,
    RawBuf<'_>,
    RawBuf<'_>,
    RawBuf<'_>,
) -> Result<()>;

/// Sparse (CSR-native) entry points for one backend.
///
/// `trsv` is part of the ABI but no built backend fills it yet; it
/// exists so callers exercising fallback logic get a real
/// `UnimplementedOperation` instead of an artificial probe.
pub(crate) struct SparseTable {
    pub abi: u32,
    pub spmv: PerType<SpmvUsmFn>,
    pub spmv_buf: PerType<SpmvBufFn>,
    pub trsv: PerType<TrsvUsmFn>,
    pub trsv_buf: PerType<TrsvBufFn>,
}
