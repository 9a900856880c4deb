//! Construct-once registry of loaded function tables
//!
//! One table exists per (domain, backend) pair for the lifetime of the
//! process. The first accessor performs the load while holding the
//! registry lock, so concurrent first use results in exactly one load
//! and every caller observes the fully populated table. Lookups after
//! that are idempotent and return the same `&'static` reference.
//!
//! Load order: providers compiled into this crate first, then a shared
//! object resolved by naming convention
//! (`<dll-prefix>unimath_<domain>_<backend><dll-suffix>`, searched in
//! `UNIMATH_BACKEND_PATH` when set). The table's `abi` field is checked
//! before first use; a mismatch fails the load rather than risking a
//! shape misread.

use super::tables::{
    BlasTable, DftTable, LapackTable, RngTable, SparseTable, ABI_VERSION,
};
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::Domain;
use libloading::Library;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// A loaded table of any domain.
#[derive(Clone, Copy)]
pub(crate) enum AnyTable {
    Blas(&'static BlasTable),
    Lapack(&'static LapackTable),
    Rng(&'static RngTable),
    Dft(&'static DftTable),
    Sparse(&'static SparseTable),
}

impl AnyTable {
    fn abi(&self) -> u32 {
        match self {
            AnyTable::Blas(t) => t.abi,
            AnyTable::Lapack(t) => t.abi,
            AnyTable::Rng(t) => t.abi,
            AnyTable::Dft(t) => t.abi,
            AnyTable::Sparse(t) => t.abi,
        }
    }
}

static TABLES: OnceLock<Mutex<HashMap<(Domain, Backend), AnyTable>>> = OnceLock::new();

/// Providers compiled into this build.
fn builtin(domain: Domain, backend: Backend) -> Option<AnyTable> {
    match backend {
        #[cfg(feature = "cpu")]
        Backend::CpuNative => Some(crate::backends::cpu::table_for(domain)),
        #[cfg(feature = "cuda")]
        Backend::Cublas if domain == Domain::Blas => {
            Some(AnyTable::Blas(crate::backends::cuda::blas_table()))
        }
        _ => None,
    }
}

fn shared_object_path(domain: Domain, backend: Backend) -> PathBuf {
    let file = format!(
        "{}unimath_{}_{}{}",
        std::env::consts::DLL_PREFIX,
        domain.name(),
        backend.name(),
        std::env::consts::DLL_SUFFIX
    );
    match std::env::var_os("UNIMATH_BACKEND_PATH") {
        Some(dir) => PathBuf::from(dir).join(file),
        None => PathBuf::from(file),
    }
}

/// Load a table from an independently built backend unit.
///
/// The unit exports one symbol per domain, `unimath_<domain>_table`,
/// returning the `&'static` table. The library handle is intentionally
/// leaked: tables live until process exit.
fn dynamic(domain: Domain, backend: Backend) -> Result<AnyTable> {
    let path = shared_object_path(domain, backend);
    let lib = unsafe { Library::new(&path) }.map_err(|e| {
        Error::unsupported(
            domain,
            format!(
                "no implementation built or loadable for backend '{}' ({})",
                backend, e
            ),
        )
    })?;

    macro_rules! resolve {
        ($variant:ident, $table:ty, $symbol:literal) => {{
            let sym = unsafe { lib.get::<fn() -> &'static $table>($symbol) }.map_err(|e| {
                Error::unsupported(
                    domain,
                    format!("backend unit {} lacks its table symbol ({})", path.display(), e),
                )
            })?;
            AnyTable::$variant(sym())
        }};
    }

    let table = match domain {
        Domain::Blas => resolve!(Blas, BlasTable, b"unimath_blas_table"),
        Domain::Lapack => resolve!(Lapack, LapackTable, b"unimath_lapack_table"),
        Domain::Rng => resolve!(Rng, RngTable, b"unimath_rng_table"),
        Domain::Dft => resolve!(Dft, DftTable, b"unimath_dft_table"),
        Domain::Sparse => resolve!(Sparse, SparseTable, b"unimath_sparse_table"),
    };

    std::mem::forget(lib);
    Ok(table)
}

fn validate(domain: Domain, backend: Backend, table: AnyTable) -> Result<AnyTable> {
    let abi = table.abi();
    if abi != ABI_VERSION {
        eprintln!(
            "[unimath::dispatch] rejecting {}/{} table: abi {} (expected {})",
            domain, backend, abi, ABI_VERSION
        );
        return Err(Error::unsupported(
            domain,
            format!(
                "backend '{}' table abi mismatch: found {}, expected {}",
                backend, abi, ABI_VERSION
            ),
        ));
    }
    Ok(table)
}

/// Fetch or construct the table for a (domain, backend) pair.
pub(crate) fn load(domain: Domain, backend: Backend) -> Result<AnyTable> {
    if backend == Backend::Unsupported {
        return Err(Error::unsupported(
            domain,
            "device resolves to no known backend",
        ));
    }

    let cache = TABLES.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(table) = guard.get(&(domain, backend)) {
        return Ok(*table);
    }

    let table = match builtin(domain, backend) {
        Some(t) => validate(domain, backend, t)?,
        None => validate(domain, backend, dynamic(domain, backend)?)?,
    };
    guard.insert((domain, backend), table);
    Ok(table)
}

macro_rules! typed_getter {
    ($name:ident, $variant:ident, $table:ty, $domain:expr) => {
        #[doc = concat!("The ", stringify!($name), " for a backend.")]
        pub(crate) fn $name(backend: Backend) -> Result<&'static $table> {
            match load($domain, backend)? {
                AnyTable::$variant(t) => Ok(t),
                _ => Err(Error::execution("internal: table kind mismatch")),
            }
        }
    };
}

typed_getter!(blas_table, Blas, BlasTable, Domain::Blas);
typed_getter!(lapack_table, Lapack, LapackTable, Domain::Lapack);
typed_getter!(rng_table, Rng, RngTable, Domain::Rng);
typed_getter!(dft_table, Dft, DftTable, Domain::Dft);
typed_getter!(sparse_table, Sparse, SparseTable, Domain::Sparse);
