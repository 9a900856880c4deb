//! Backend providers compiled into this crate
//!
//! Each provider supplies the same things: typed entry points the
//! compile-time selector monomorphizes into, and erased function tables
//! the runtime registry hands out. Providers standing in for vendor
//! libraries keep their kernels deliberately simple; the dispatch layer
//! treats them as opaque either way.

#[cfg(feature = "cpu")]
pub mod cpu;

#[cfg(feature = "cuda")]
pub mod cuda;
