//! Backend identifier registry
//!
//! Enumerates the backend libraries the dispatch layer knows how to
//! reach and maps a device's vendor/platform metadata to the identifier
//! serving each domain. Identification never fails: metadata that
//! matches no signature resolves to [`Backend::Unsupported`], deferring
//! the failure to the call site that actually needs a table.

use crate::queue::Device;
use crate::types::Domain;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

/// One concrete vendor/library implementation of a math domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Built-in CPU reference library (all domains)
    CpuNative,
    /// NVIDIA dense BLAS
    Cublas,
    /// NVIDIA dense solvers
    Cusolver,
    /// NVIDIA random generation
    Curand,
    /// NVIDIA FFT
    Cufft,
    /// NVIDIA sparse BLAS
    Cusparse,
    /// AMD dense BLAS
    Rocblas,
    /// AMD dense solvers
    Rocsolver,
    /// AMD random generation
    Rocrand,
    /// AMD FFT
    Rocfft,
    /// AMD sparse BLAS
    Rocsparse,
    /// No known backend serves this device/domain
    Unsupported,
}

impl Backend {
    /// Lowercase name used in diagnostics and shared-object naming.
    pub const fn name(self) -> &'static str {
        match self {
            Backend::CpuNative => "cpunative",
            Backend::Cublas => "cublas",
            Backend::Cusolver => "cusolver",
            Backend::Curand => "curand",
            Backend::Cufft => "cufft",
            Backend::Cusparse => "cusparse",
            Backend::Rocblas => "rocblas",
            Backend::Rocsolver => "rocsolver",
            Backend::Rocrand => "rocrand",
            Backend::Rocfft => "rocfft",
            Backend::Rocsparse => "rocsparse",
            Backend::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One signature row: a platform substring and the backend serving each
/// domain on matching devices, in `Domain::ALL` order.
struct Signature {
    platform_contains: &'static str,
    per_domain: [Backend; 5],
}

// Priority-ordered; first match wins.
static SIGNATURES: &[Signature] = &[
    Signature {
        platform_contains: "host",
        per_domain: [Backend::CpuNative; 5],
    },
    Signature {
        platform_contains: "cuda",
        per_domain: [
            Backend::Cublas,
            Backend::Cusolver,
            Backend::Curand,
            Backend::Cufft,
            Backend::Cusparse,
        ],
    },
    Signature {
        platform_contains: "hip",
        per_domain: [
            Backend::Rocblas,
            Backend::Rocsolver,
            Backend::Rocrand,
            Backend::Rocfft,
            Backend::Rocsparse,
        ],
    },
];

fn domain_slot(domain: Domain) -> usize {
    Domain::ALL
        .iter()
        .position(|d| *d == domain)
        .expect("domain present in Domain::ALL")
}

fn identify_uncached(device: &Device, domain: Domain) -> Backend {
    let platform = device.platform().to_ascii_lowercase();
    for sig in SIGNATURES {
        if platform.contains(sig.platform_contains) {
            return sig.per_domain[domain_slot(domain)];
        }
    }
    Backend::Unsupported
}

// Memoization keyed by device identity. Safe because the device-to-backend
// mapping is invariant for a device's lifetime.
static IDENTIFY_CACHE: OnceLock<Mutex<HashMap<(u64, Domain), Backend>>> = OnceLock::new();

/// Resolve the backend serving `domain` on `device`.
///
/// Returns [`Backend::Unsupported`] (never an error) when no signature
/// matches; call sites needing a table turn that into
/// `Error::UnsupportedBackend`.
pub fn identify(device: &Device, domain: Domain) -> Backend {
    let cache = IDENTIFY_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
    *guard
        .entry((device.uid(), domain))
        .or_insert_with(|| identify_uncached(device, domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_serves_all_domains() {
        let dev = Device::cpu();
        for domain in Domain::ALL {
            assert_eq!(identify(&dev, domain), Backend::CpuNative);
        }
    }

    #[test]
    fn test_cuda_platform_splits_per_domain() {
        let dev = Device::from_metadata("nvidia corporation", "CUDA", 0);
        assert_eq!(identify(&dev, Domain::Blas), Backend::Cublas);
        assert_eq!(identify(&dev, Domain::Lapack), Backend::Cusolver);
        assert_eq!(identify(&dev, Domain::Rng), Backend::Curand);
        assert_eq!(identify(&dev, Domain::Dft), Backend::Cufft);
        assert_eq!(identify(&dev, Domain::Sparse), Backend::Cusparse);
    }

    #[test]
    fn test_unknown_platform_is_unsupported() {
        let dev = Device::from_metadata("acme devices", "frobnicator 9000", 3);
        assert_eq!(identify(&dev, Domain::Blas), Backend::Unsupported);
    }

    #[test]
    fn test_identification_is_stable() {
        let dev = Device::from_metadata("amd", "hip runtime", 1);
        let first = identify(&dev, Domain::Sparse);
        assert_eq!(first, Backend::Rocsparse);
        assert_eq!(identify(&dev, Domain::Sparse), first);
    }
}
