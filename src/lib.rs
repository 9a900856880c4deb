//! # unimath
//!
//! **One API surface for dense/sparse linear algebra, RNG, and FFT across
//! pluggable math backends.**
//!
//! unimath lets callers write device-agnostic numerical code: the same
//! call runs against CPU reference kernels, a vendor GPU library, or an
//! independently built backend unit, selected either at compile time or
//! at run time.
//!
//! ## Why unimath?
//!
//! - **Two selection strategies**: zero-overhead compile-time binding
//!   ([`select::Static`]) and per-call runtime dispatch
//!   ([`select::Dynamic`]) behind one facade signature
//! - **Two layouts**: every BLAS/sparse operation exposed row-major and
//!   column-major over one backend-facing implementation
//! - **Two memory models**: managed [`buffer::Buffer`] containers with
//!   implicit ordering, or raw device handles with explicit dependency
//!   events
//! - **Closed error taxonomy**: unsupported backend, unimplemented
//!   operation, invalid argument, execution failure - never conflated
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use unimath::prelude::*;
//!
//! let device = Device::cpu();
//! let queue = Queue::new(&device);
//! let sel = Dynamic::new(&queue);
//!
//! let a = Buffer::from_slice(&[1.0f64, 2.0, 3.0, 4.0]);
//! let b = Buffer::from_slice(&[5.0f64, 6.0, 7.0, 8.0]);
//! let c = Buffer::<f64>::zeroed(4);
//!
//! blas::row_major::gemm_buf(
//!     &sel, Transpose::NoTrans, Transpose::NoTrans,
//!     2, 2, 2, 1.0, &a, 2, &b, 2, 0.0, &c, 2,
//! )?;
//! let product = c.read()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): built-in CPU reference backend
//! - `rayon` (default): multi-threaded CPU matrix kernels
//! - `cuda`: cuBLAS-backed runtime entries for NVIDIA devices

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod backend;
pub(crate) mod backends;
pub mod blas;
pub mod buffer;
pub mod complex;
pub mod dft;
pub(crate) mod dispatch;
pub mod error;
pub mod event;
pub(crate) mod exec;
pub mod lapack;
pub(crate) mod layout;
pub mod queue;
pub mod rng;
pub mod scalar;
pub mod select;
pub mod sparse;
pub mod types;
pub mod usm;

/// Re-export of the CPU backend marker for compile-time selection.
#[cfg(feature = "cpu")]
pub use backends::cpu::CpuNative;

/// Default compile-time backend for backend-homogeneous builds.
#[cfg(feature = "cpu")]
pub type DefaultBackend = CpuNative;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{identify, Backend};
    pub use crate::buffer::Buffer;
    pub use crate::complex::{Complex32, Complex64};
    pub use crate::error::{Error, Result};
    pub use crate::event::Event;
    pub use crate::queue::{Device, Queue};
    pub use crate::scalar::{ComplexScalar, RealScalar, Scalar};
    pub use crate::select::{Dynamic, Static};
    pub use crate::types::{DataType, Domain, Layout, Transpose, UpLo};

    #[cfg(feature = "cpu")]
    pub use crate::CpuNative;
}
