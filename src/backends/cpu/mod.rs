//! CPU-native backend
//!
//! The built-in reference library: host-pointer kernels submitted through
//! the same host-task envelope as every other backend. Serves all five
//! domains. Complex entries exist for BLAS and DFT; LAPACK, RNG, and
//! sparse tables carry real entries only, matching what the vendor
//! libraries this provider stands in for export.

pub(crate) mod blas;
pub(crate) mod dft;
pub(crate) mod lapack;
pub(crate) mod rng;
pub(crate) mod sparse;

use crate::backend::{identify, Backend};
use crate::dispatch::registry::AnyTable;
use crate::queue::Device;
use crate::select::NativeBackend;
use crate::types::Domain;

/// Marker type selecting the CPU-native backend at compile time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuNative;

impl NativeBackend for CpuNative {
    const NAME: &'static str = "cpunative";

    fn accepts(device: &Device) -> bool {
        identify(device, Domain::Blas) == Backend::CpuNative
    }
}

/// Hand the registry the table for one domain.
pub(crate) fn table_for(domain: Domain) -> AnyTable {
    match domain {
        Domain::Blas => AnyTable::Blas(&blas::TABLE),
        Domain::Lapack => AnyTable::Lapack(&lapack::TABLE),
        Domain::Rng => AnyTable::Rng(&rng::TABLE),
        Domain::Dft => AnyTable::Dft(&dft::TABLE),
        Domain::Sparse => AnyTable::Sparse(&sparse::TABLE),
    }
}

/// Entry array covering all four scalar slots.
macro_rules! all_types {
    ($f:ident, $ty:ty) => {
        [
            Some($f::<f32> as $ty),
            Some($f::<f64> as $ty),
            Some($f::<$crate::complex::Complex32> as $ty),
            Some($f::<$crate::complex::Complex64> as $ty),
        ]
    };
}

/// Entry array covering the real slots only.
macro_rules! real_types {
    ($f:ident, $ty:ty) => {
        [
            Some($f::<f32> as $ty),
            Some($f::<f64> as $ty),
            None,
            None,
        ]
    };
}

/// Entry array covering the complex slots only.
macro_rules! complex_types {
    ($f:ident, $ty:ty) => {
        [
            None,
            None,
            Some($f::<$crate::complex::Complex32> as $ty),
            Some($f::<$crate::complex::Complex64> as $ty),
        ]
    };
}

pub(crate) use all_types;
pub(crate) use complex_types;
pub(crate) use real_types;
