//! Request-scoped call descriptors shared by every domain facade
//!
//! These types describe *how* a call's arguments are laid out, never the
//! data itself. They are derived per call and never persisted.

use std::fmt;

/// Storage/argument convention of matrix operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Consecutive elements of a row are adjacent in memory
    RowMajor,
    /// Consecutive elements of a column are adjacent in memory
    ColMajor,
}

/// Transposition applied to a matrix operand before the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transpose {
    /// Use the operand as stored
    NoTrans,
    /// Use the transpose of the operand
    Trans,
    /// Use the conjugate transpose of the operand
    ConjTrans,
}

/// Which triangle of a symmetric/triangular operand carries the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpLo {
    /// Upper triangle is stored
    Upper,
    /// Lower triangle is stored
    Lower,
}

/// One mathematical area served by a backend library.
///
/// Each (domain, backend) pair resolves to exactly one function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Dense basic linear algebra (level 1-3)
    Blas,
    /// Dense factorizations and solvers
    Lapack,
    /// Random number generation
    Rng,
    /// Discrete Fourier transforms
    Dft,
    /// Sparse basic linear algebra
    Sparse,
}

impl Domain {
    /// All domains, in table order.
    pub const ALL: [Domain; 5] = [
        Domain::Blas,
        Domain::Lapack,
        Domain::Rng,
        Domain::Dft,
        Domain::Sparse,
    ];

    /// Lowercase name used in diagnostics and shared-object naming.
    pub const fn name(self) -> &'static str {
        match self {
            Domain::Blas => "blas",
            Domain::Lapack => "lapack",
            Domain::Rng => "rng",
            Domain::Dft => "dft",
            Domain::Sparse => "sparse",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar types a function table carries entries for.
///
/// Used as the index into per-operation entry arrays, so the discriminant
/// order is part of the table ABI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum DataType {
    /// 32-bit real
    F32 = 0,
    /// 64-bit real
    F64 = 1,
    /// 32-bit complex (interleaved)
    C32 = 2,
    /// 64-bit complex (interleaved)
    C64 = 3,
}

impl DataType {
    /// Number of scalar types in the table ABI.
    pub const COUNT: usize = 4;

    /// Index into a per-operation entry array.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used in diagnostics ("f32", "c64", ...).
    pub const fn name(self) -> &'static str {
        match self {
            DataType::F32 => "f32",
            DataType::F64 => "f64",
            DataType::C32 => "c32",
            DataType::C64 => "c64",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
