//! Error types for unimath
//!
//! The taxonomy is deliberately closed: every failure a caller can observe
//! is one of four kinds, and no kind is ever downgraded into another.
//! Backend-native failures are carried verbatim inside `ExecutionFailure`.

use crate::backend::Backend;
use crate::types::Domain;
use thiserror::Error;

/// Result type alias using unimath's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when dispatching or executing an operation
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Device resolves to no usable backend, or the domain has no built
    /// implementation for an otherwise recognized backend. A deployment
    /// gap; never retried.
    #[error("unsupported backend for {domain}: {detail}")]
    UnsupportedBackend {
        /// Domain whose table was requested
        domain: Domain,
        /// What was missing (unknown vendor, absent shared object, ABI mismatch)
        detail: String,
    },

    /// Backend recognized and its table loaded, but this operation/type
    /// combination has no entry. Distinct from `UnsupportedBackend` so a
    /// caller can fall back per-operation.
    #[error("operation '{op}' not implemented by {backend} ({domain})")]
    UnimplementedOperation {
        /// Backend whose table lacks the entry
        backend: Backend,
        /// Domain of the table
        domain: Domain,
        /// Operation name, including the scalar type suffix
        op: &'static str,
    },

    /// Caller-supplied value or shape outside the valid range. Detected
    /// before any device submission.
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The backend's native call reported a runtime error during or after
    /// submission. Carries the backend-reported description verbatim.
    #[error("execution failure: {detail}")]
    ExecutionFailure {
        /// Backend-reported status description
        detail: String,
    },
}

impl Error {
    /// Create an unsupported-backend error
    pub fn unsupported(domain: Domain, detail: impl Into<String>) -> Self {
        Self::UnsupportedBackend {
            domain,
            detail: detail.into(),
        }
    }

    /// Create an unimplemented-operation error
    pub fn unimplemented(backend: Backend, domain: Domain, op: &'static str) -> Self {
        Self::UnimplementedOperation {
            backend,
            domain,
            op,
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_arg(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an execution-failure error
    pub fn execution(detail: impl Into<String>) -> Self {
        Self::ExecutionFailure {
            detail: detail.into(),
        }
    }
}
